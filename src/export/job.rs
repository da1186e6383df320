use crate::encode::formats::ImageFormat;
use crate::foundation::core::{Canvas, Fps};
use crate::render::resize::AspectPolicy;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stage of an export that a progress report refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    /// Rendering and writing frame images.
    Frames,
    /// Writing (and possibly transcoding) the audio track.
    Audio,
    /// Muxing frames and audio into the video container.
    Mux,
}

/// A single progress update. `done` never decreases within one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    pub phase: ExportPhase,
    pub done: u64,
    pub total: u64,
}

impl ExportProgress {
    /// Completed fraction of the current phase in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// Receiver of export progress.
///
/// Reports are delivered from the thread driving the export, never from render workers.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: ExportProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(ExportProgress) + Send + Sync,
{
    fn report(&self, progress: ExportProgress) {
        self(progress)
    }
}

/// Cooperative cancellation flag shared between a caller and a running export.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Work already dispatched still runs to completion.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for a finished or cancelled export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames the job would produce when run to completion.
    pub frames_total: u64,
    /// Frames actually written to disk.
    pub frames_written: u64,
}

/// Result of an export that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum ExportOutcome {
    Completed(ExportStats),
    /// Stopped by the caller. Files written before the stop are left on disk.
    Cancelled(ExportStats),
}

impl ExportOutcome {
    pub fn stats(&self) -> ExportStats {
        match self {
            Self::Completed(s) | Self::Cancelled(s) => *s,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Parameters shared by the export operations.
#[derive(Clone)]
pub struct ExportJob {
    /// Frame rate for sequences and video.
    pub fps: Fps,
    /// Output size; `None` keeps the visualization geometry.
    pub size: Option<Canvas>,
    pub aspect: AspectPolicy,
    /// Image format for sequence frames.
    pub image_format: ImageFormat,
    /// Stamp the watermark over every frame.
    pub watermark: bool,
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Frames dispatched per batch; cancellation is checked between batches.
    pub chunk_size: usize,
    /// Parent of the private scratch directory; `None` uses the system temp dir.
    pub scratch_root: Option<PathBuf>,
    pub progress: Option<Arc<dyn ProgressSink>>,
    pub cancel: CancelToken,
}

impl Default for ExportJob {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            size: None,
            aspect: AspectPolicy::Stretch,
            image_format: ImageFormat::Png,
            watermark: false,
            threads: None,
            chunk_size: 64,
            scratch_root: None,
            progress: None,
            cancel: CancelToken::new(),
        }
    }
}

impl fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportJob")
            .field("fps", &self.fps)
            .field("size", &self.size)
            .field("aspect", &self.aspect)
            .field("image_format", &self.image_format)
            .field("watermark", &self.watermark)
            .field("threads", &self.threads)
            .field("chunk_size", &self.chunk_size)
            .field("scratch_root", &self.scratch_root)
            .field("progress", &self.progress.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ExportJob {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: Canvas, aspect: AspectPolicy) -> Self {
        self.size = Some(size);
        self.aspect = aspect;
        self
    }

    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    pub fn with_watermark(mut self, watermark: bool) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub(crate) fn report(&self, phase: ExportPhase, done: u64, total: u64) {
        if let Some(sink) = &self.progress {
            sink.report(ExportProgress { phase, done, total });
        }
    }

    pub(crate) fn normalized_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
