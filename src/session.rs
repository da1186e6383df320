use crate::audio::container::{AudioContainer, AudioSettings};
use crate::config::WaterfallConfig;
use crate::export::pipeline::{Exporter, FrameRenderer};
use crate::foundation::core::FrameGeometry;
use crate::foundation::error::WaterfallResult;
use crate::format::color_format::ColorFormatSpec;
use crate::render::frame::FrameRGB;
use crate::source::waveform::WaveformSource;
use std::path::Path;

/// A loaded file together with the settings that decide how it looks and sounds.
///
/// The audio container is derived state. It is replaced wholesale by [`Waterfall::rebuild`],
/// which `open` and `set_audio_settings` call; nothing recomputes it implicitly.
#[derive(Clone, Debug)]
pub struct Waterfall {
    source: Option<WaveformSource>,
    geometry: FrameGeometry,
    color_format: ColorFormatSpec,
    audio_settings: AudioSettings,
    flip_vertical: bool,
    audio: Option<AudioContainer>,
}

impl Default for Waterfall {
    fn default() -> Self {
        Self {
            source: None,
            geometry: FrameGeometry::default(),
            color_format: ColorFormatSpec::default(),
            audio_settings: AudioSettings::default(),
            flip_vertical: true,
            audio: None,
        }
    }
}

impl Waterfall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty session from validated config values.
    pub fn from_config(cfg: &WaterfallConfig) -> WaterfallResult<Self> {
        cfg.audio.validate()?;
        Ok(Self {
            geometry: cfg.geometry()?,
            color_format: cfg.color_format()?,
            audio_settings: cfg.audio,
            flip_vertical: cfg.flip_vertical,
            ..Self::default()
        })
    }

    /// Load `path` as the new source and rebuild the audio.
    ///
    /// On failure the previous source stays loaded.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn open(&mut self, path: impl AsRef<Path>) -> WaterfallResult<()> {
        let source = WaveformSource::load(path)?;
        self.set_source(source)
    }

    /// Replace the source with an already loaded one and rebuild the audio.
    pub fn set_source(&mut self, source: WaveformSource) -> WaterfallResult<()> {
        let audio = AudioContainer::build(source.bytes(), self.audio_settings)?;
        tracing::info!(
            name = %source.display_name(),
            bytes = source.total_bytes(),
            duration_ms = audio.duration_ms(),
            "opened source"
        );
        self.source = Some(source);
        self.audio = Some(audio);
        Ok(())
    }

    /// Drop the source and its audio.
    pub fn close(&mut self) {
        self.source = None;
        self.audio = None;
    }

    /// Rebuild the audio container from the current source and settings.
    pub fn rebuild(&mut self) -> WaterfallResult<()> {
        self.audio = match &self.source {
            Some(source) => Some(AudioContainer::build(source.bytes(), self.audio_settings)?),
            None => None,
        };
        Ok(())
    }

    pub fn source(&self) -> Option<&WaveformSource> {
        self.source.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioContainer> {
        self.audio.as_ref()
    }

    /// Audio duration in milliseconds, 0 without a source.
    pub fn duration_ms(&self) -> u64 {
        self.audio.as_ref().map_or(0, AudioContainer::duration_ms)
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, width: u32, height: u32) -> WaterfallResult<()> {
        self.geometry = FrameGeometry::new(width, height)?;
        Ok(())
    }

    pub fn color_format(&self) -> &ColorFormatSpec {
        &self.color_format
    }

    pub fn set_color_format(&mut self, format: &str) -> WaterfallResult<()> {
        self.color_format = ColorFormatSpec::parse(format)?;
        Ok(())
    }

    pub fn audio_settings(&self) -> AudioSettings {
        self.audio_settings
    }

    /// Validate and apply new audio settings, then rebuild.
    ///
    /// Invalid settings leave the session unchanged.
    pub fn set_audio_settings(&mut self, settings: AudioSettings) -> WaterfallResult<()> {
        settings.validate()?;
        let previous = std::mem::replace(&mut self.audio_settings, settings);
        if let Err(e) = self.rebuild() {
            self.audio_settings = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    pub fn set_flip_vertical(&mut self, flip: bool) {
        self.flip_vertical = flip;
    }

    /// Snapshot of the current state for rendering frames.
    pub fn renderer(&self) -> FrameRenderer {
        FrameRenderer::new(
            self.source.as_ref().map(WaveformSource::shared_bytes),
            self.duration_ms(),
            self.color_format.clone(),
            self.geometry,
            self.flip_vertical,
        )
    }

    /// Export operations over the current state.
    pub fn exporter(&self) -> Exporter<'_> {
        Exporter::new(self.renderer(), self.audio.as_ref())
    }

    /// Byte offset visualized at `timestamp_ms`.
    pub fn address_at(&self, timestamp_ms: u64) -> u64 {
        self.renderer().address_at(timestamp_ms)
    }

    /// Frame at `timestamp_ms`, unclamped (timestamps past the end show zero padding).
    pub fn frame_at(&self, timestamp_ms: u64) -> FrameRGB {
        self.renderer().render(timestamp_ms)
    }

    /// Frame for a playback position, clamped into `[0, duration_ms]`.
    pub fn playback_frame_at(&self, position_ms: i64) -> FrameRGB {
        let clamped = u64::try_from(position_ms.max(0))
            .unwrap_or(0)
            .min(self.duration_ms());
        self.frame_at(clamped)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
