//! Output formats and the external `ffmpeg` collaborator.
//!
//! Images are encoded in-process with `image`, WAVE audio with `hound`. MP3/FLAC audio and all
//! video containers are produced by the system `ffmpeg` binary.

/// `ffmpeg` process wrappers (transcode, mux).
pub mod ffmpeg;
/// Image, audio and video format selectors.
pub mod formats;
