use crate::audio::container::AudioContainer;
use crate::encode::ffmpeg::{self, MuxConfig};
use crate::encode::formats::{AudioFormat, ImageFormat, VideoFormat};
use crate::export::job::{ExportJob, ExportOutcome, ExportPhase, ExportStats};
use crate::foundation::core::{Canvas, Fps, FrameGeometry, FrameIndex};
use crate::foundation::error::{WaterfallError, WaterfallResult};
use crate::format::color_format::ColorFormatSpec;
use crate::render::frame::{FrameRGB, synthesize};
use crate::render::resize::{AspectPolicy, resize_frame};
use crate::render::watermark::{Watermark, WatermarkStamp};
use crate::source::address::compute_address;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

/// Everything needed to turn a timestamp into a frame, detached from the session.
///
/// Cheap to clone: the source buffer is shared.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    buffer: Option<Arc<[u8]>>,
    duration_ms: u64,
    spec: ColorFormatSpec,
    geometry: FrameGeometry,
    flip_vertical: bool,
}

impl FrameRenderer {
    pub fn new(
        buffer: Option<Arc<[u8]>>,
        duration_ms: u64,
        spec: ColorFormatSpec,
        geometry: FrameGeometry,
        flip_vertical: bool,
    ) -> Self {
        Self {
            buffer,
            duration_ms,
            spec,
            geometry,
            flip_vertical,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Byte offset shown at `timestamp_ms` (0 without a source).
    pub fn address_at(&self, timestamp_ms: u64) -> u64 {
        match &self.buffer {
            Some(buffer) => compute_address(
                timestamp_ms,
                buffer.len() as u64,
                self.duration_ms,
                self.geometry.width,
                self.spec.color_bytes(),
            ),
            None => 0,
        }
    }

    /// Frame shown at `timestamp_ms`; all black when no source is loaded.
    pub fn render(&self, timestamp_ms: u64) -> FrameRGB {
        match &self.buffer {
            Some(buffer) => synthesize(
                buffer,
                self.address_at(timestamp_ms),
                &self.spec,
                self.geometry,
                self.flip_vertical,
            ),
            None => FrameRGB::black(self.geometry.width, self.geometry.height),
        }
    }
}

/// Renders, resizes, watermarks and writes frames for one job.
struct FrameWriter<'a> {
    renderer: &'a FrameRenderer,
    size: Option<Canvas>,
    aspect: AspectPolicy,
    stamp: Option<WatermarkStamp>,
}

impl<'a> FrameWriter<'a> {
    fn new(renderer: &'a FrameRenderer, job: &ExportJob) -> WaterfallResult<Self> {
        let stamp = if job.watermark {
            let (w, h) = match job.size {
                Some(c) => (c.width, c.height),
                None => (renderer.geometry.width, renderer.geometry.height),
            };
            Some(Watermark::builtin()?.stamp(w, h)?)
        } else {
            None
        };
        Ok(Self {
            renderer,
            size: job.size,
            aspect: job.aspect,
            stamp,
        })
    }

    fn frame(&self, timestamp_ms: u64) -> WaterfallResult<FrameRGB> {
        let frame = self.renderer.render(timestamp_ms);
        let mut frame = match self.size {
            Some(size) => resize_frame(frame, size, self.aspect)?,
            None => frame,
        };
        if let Some(stamp) = &self.stamp {
            stamp.apply(&mut frame)?;
        }
        Ok(frame)
    }

    fn write(&self, timestamp_ms: u64, path: &Path, format: ImageFormat) -> WaterfallResult<()> {
        save_frame(self.frame(timestamp_ms)?, path, format)
    }
}

fn save_frame(frame: FrameRGB, path: &Path, format: ImageFormat) -> WaterfallResult<()> {
    frame
        .into_image()?
        .save_with_format(path, format.as_image_format())
        .map_err(|e| match e {
            image::ImageError::IoError(io) => WaterfallError::io(path, io),
            other => WaterfallError::encode(format!(
                "failed to write image '{}': {other}",
                path.display()
            )),
        })
}

/// File name of sequence frame `index`, zero-padded to `digits`.
pub fn sequence_file_name(index: u64, digits: usize, format: ImageFormat) -> String {
    format!("{index:0digits$}.{}", format.extension())
}

/// Zero-padding width used for a sequence of `frame_count` frames.
pub fn sequence_digits(frame_count: u64) -> usize {
    frame_count.to_string().len()
}

/// Export operations over one snapshot of a session.
pub struct Exporter<'a> {
    renderer: FrameRenderer,
    audio: Option<&'a AudioContainer>,
}

impl<'a> Exporter<'a> {
    pub fn new(renderer: FrameRenderer, audio: Option<&'a AudioContainer>) -> Self {
        Self { renderer, audio }
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    fn require_audio(&self) -> WaterfallResult<&'a AudioContainer> {
        self.audio
            .ok_or_else(|| WaterfallError::validation("no source file is loaded"))
    }

    /// `round(duration_secs * fps)`.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.frame_count(self.renderer.duration_ms)
    }

    /// Write the frame at `timestamp_ms` to `dest`, format chosen by extension.
    #[tracing::instrument(skip(self, job), fields(dest = %dest.display()))]
    pub fn export_frame(
        &self,
        timestamp_ms: u64,
        dest: &Path,
        job: &ExportJob,
    ) -> WaterfallResult<()> {
        let format = ImageFormat::from_path(dest)?;
        ffmpeg::ensure_parent_dir(dest)?;
        FrameWriter::new(&self.renderer, job)?.write(timestamp_ms, dest, format)
    }

    /// Write every frame of the audio duration into `dir` as numbered images.
    ///
    /// Frames render in parallel batches of `job.chunk_size`. Cancellation is checked before
    /// each batch is dispatched; frames of a dispatched batch always finish and stay on disk.
    #[tracing::instrument(skip(self, job), fields(dir = %dir.display()))]
    pub fn export_sequence(&self, dir: &Path, job: &ExportJob) -> WaterfallResult<ExportOutcome> {
        self.require_audio()?;
        std::fs::create_dir_all(dir).map_err(|e| WaterfallError::io(dir, e))?;

        let total = self.frame_count(job.fps);
        let digits = sequence_digits(total);
        let writer = FrameWriter::new(&self.renderer, job)?;
        let pool = build_thread_pool(job.threads)?;
        let chunk = job.normalized_chunk_size() as u64;
        let (fps, format) = (job.fps, job.image_format);

        let mut stats = ExportStats {
            frames_total: total,
            frames_written: 0,
        };
        job.report(ExportPhase::Frames, 0, total);

        let mut chunk_start = 0u64;
        while chunk_start < total {
            if job.cancel.is_cancelled() {
                tracing::info!(written = stats.frames_written, total, "sequence export cancelled");
                return Ok(ExportOutcome::Cancelled(stats));
            }
            let chunk_end = (chunk_start + chunk).min(total);

            let mut first_err = None;
            pool.in_place_scope(|scope| {
                let (tx, rx) = mpsc::channel::<WaterfallResult<()>>();
                let writer = &writer;
                for index in chunk_start..chunk_end {
                    let tx = tx.clone();
                    scope.spawn(move |_| {
                        let path = dir.join(sequence_file_name(index, digits, format));
                        let ts = fps.timestamp_ms(FrameIndex(index));
                        // The receiver outlives every worker of this batch.
                        let _ = tx.send(writer.write(ts, &path, format));
                    });
                }
                drop(tx);

                for res in rx {
                    match res {
                        Ok(()) => {
                            stats.frames_written += 1;
                            job.report(ExportPhase::Frames, stats.frames_written, total);
                        }
                        Err(e) => {
                            if first_err.is_none() {
                                first_err = Some(e);
                            }
                        }
                    }
                }
            });
            if let Some(e) = first_err {
                return Err(e);
            }

            chunk_start = chunk_end;
        }

        tracing::info!(frames = total, "sequence export finished");
        Ok(ExportOutcome::Completed(stats))
    }

    /// Write the audio container to `dest`; MP3/FLAC go through a scratch WAVE file.
    #[tracing::instrument(skip(self), fields(dest = %dest.display()))]
    pub fn export_audio(&self, dest: &Path) -> WaterfallResult<()> {
        let audio = self.require_audio()?;
        let format = AudioFormat::from_path(dest)?;
        ffmpeg::ensure_parent_dir(dest)?;

        match format {
            AudioFormat::Wav => audio.write_wav(dest),
            other => {
                let scratch = scratch_dir(None)?;
                let wav = scratch.path().join("audio.wav");
                audio.write_wav(&wav)?;
                ffmpeg::transcode_audio(&wav, dest, other)
            }
        }
    }

    /// Render a sequence, write the audio and mux both into `dest`.
    ///
    /// All intermediate files live in a private scratch directory that is removed on every exit
    /// path. `dest` is only touched once muxing succeeded, so a cancelled or failed export
    /// leaves it as it was.
    #[tracing::instrument(skip(self, job), fields(dest = %dest.display()))]
    pub fn export_video(&self, dest: &Path, job: &ExportJob) -> WaterfallResult<ExportOutcome> {
        let format = VideoFormat::from_path(dest)?;
        let audio = self.require_audio()?;
        if !ffmpeg::is_ffmpeg_on_path() {
            return Err(WaterfallError::encode(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }
        let total = self.frame_count(job.fps);
        if total == 0 {
            return Err(WaterfallError::validation(format!(
                "audio duration {} ms is too short for a single frame at {} fps",
                self.renderer.duration_ms,
                job.fps.as_f64()
            )));
        }
        self.render_video(dest, job, format, audio, total)
    }

    /// Frames, audio and mux phases of [`Exporter::export_video`], once ffmpeg was found.
    fn render_video(
        &self,
        dest: &Path,
        job: &ExportJob,
        format: VideoFormat,
        audio: &AudioContainer,
        total: u64,
    ) -> WaterfallResult<ExportOutcome> {
        let scratch = scratch_dir(job.scratch_root.as_deref())?;
        let images = scratch.path().join("images");
        let frames_job = job.clone().with_image_format(ImageFormat::Png);
        let outcome = self.export_sequence(&images, &frames_job)?;
        if outcome.is_cancelled() {
            tracing::info!("video export cancelled before muxing");
            return Ok(outcome);
        }

        job.report(ExportPhase::Audio, 0, 1);
        let wav = scratch.path().join("audio.wav");
        audio.write_wav(&wav)?;
        job.report(ExportPhase::Audio, 1, 1);

        job.report(ExportPhase::Mux, 0, 1);
        let muxed = scratch.path().join(format!("video.{}", format.extension()));
        let pattern = format!("%0{}d.png", sequence_digits(total));
        ffmpeg::mux_sequence(&MuxConfig {
            frames_pattern: images.join(pattern),
            fps: job.fps,
            audio_path: wav,
            out_path: muxed.clone(),
            format,
        })?;
        move_into_place(&muxed, dest)?;
        job.report(ExportPhase::Mux, 1, 1);

        let scratch_path = scratch.path().to_path_buf();
        scratch
            .close()
            .map_err(|e| WaterfallError::io(scratch_path, e))?;
        tracing::info!(frames = total, "video export finished");
        Ok(outcome)
    }
}

fn scratch_dir(root: Option<&Path>) -> WaterfallResult<tempfile::TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("binary-waterfall-");
    match root {
        Some(root) => {
            std::fs::create_dir_all(root).map_err(|e| WaterfallError::io(root, e))?;
            builder.tempdir_in(root).map_err(|e| WaterfallError::io(root, e))
        }
        None => builder
            .tempdir()
            .map_err(|e| WaterfallError::io(std::env::temp_dir(), e)),
    }
}

/// Move `src` to `dest`, replacing it in one step.
///
/// A plain rename is tried first. Across filesystems the bytes are copied into a temporary file
/// next to `dest` which is then renamed over it.
fn move_into_place(src: &Path, dest: &Path) -> WaterfallResult<()> {
    ffmpeg::ensure_parent_dir(dest)?;
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }

    let dir: PathBuf = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| WaterfallError::io(&dir, e))?;
    let mut input = std::fs::File::open(src).map_err(|e| WaterfallError::io(src, e))?;
    std::io::copy(&mut input, tmp.as_file_mut()).map_err(|e| WaterfallError::io(dest, e))?;
    tmp.persist(dest)
        .map_err(|e| WaterfallError::io(dest, e.error))?;
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> WaterfallResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WaterfallError::validation(
            "export 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("waterfall-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WaterfallError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
