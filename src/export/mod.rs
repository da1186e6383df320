//! Export pipeline: single frames, numbered image sequences, audio, and muxed video.
//!
//! All operations take an [`job::ExportJob`]. Sequence rendering is the only parallel step;
//! it fans frames out over a rayon pool in batches and checks the job's
//! [`job::CancelToken`] between batches.

pub mod job;
pub mod pipeline;
