//! Binary waterfall: any file as a synchronized picture and sound.
//!
//! The source bytes are played back as raw PCM audio while a frame of pixels scrolls through
//! the same bytes. Every playback timestamp maps deterministically to a byte offset, so the
//! on-screen frame and every exported frame agree exactly.
//!
//! - Open a file in a [`Waterfall`] session
//! - Query frames with [`Waterfall::frame_at`] / [`Waterfall::playback_frame_at`]
//! - Export frames, sequences, audio or video through [`Waterfall::exporter`]
#![forbid(unsafe_code)]

pub mod audio;
pub mod config;
pub mod encode;
pub mod export;
pub mod format;
pub mod foundation;
pub mod render;
pub mod session;
pub mod source;

pub use crate::audio::container::{AudioContainer, AudioSettings};
pub use crate::config::WaterfallConfig;
pub use crate::encode::formats::{AudioFormat, ImageFormat, VideoFormat};
pub use crate::export::job::{
    CancelToken, ExportJob, ExportOutcome, ExportPhase, ExportProgress, ExportStats, ProgressSink,
};
pub use crate::export::pipeline::{Exporter, FrameRenderer};
pub use crate::format::color_format::{ChannelTag, ColorFormatSpec, ColorMode};
pub use crate::foundation::core::{Canvas, Fps, FrameGeometry, FrameIndex};
pub use crate::foundation::error::{WaterfallError, WaterfallResult};
pub use crate::render::frame::FrameRGB;
pub use crate::render::resize::AspectPolicy;
pub use crate::session::Waterfall;
pub use crate::source::address::compute_address;
pub use crate::source::waveform::WaveformSource;
