use crate::audio::container::AudioSettings;
use crate::foundation::core::FrameGeometry;
use crate::foundation::error::{WaterfallError, WaterfallResult};
use crate::format::color_format::{ColorFormatSpec, DEFAULT_COLOR_FORMAT};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Persistent visualization settings, read from JSON.
///
/// Every field is optional in the file and falls back to its default. Values are checked by
/// [`WaterfallConfig::validate`], not during deserialization, so errors name the bad setting.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaterfallConfig {
    pub width: u32,
    pub height: u32,
    pub color_format: String,
    /// Draw the first source row at the bottom of the frame.
    pub flip_vertical: bool,
    pub audio: AudioSettings,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        let geometry = FrameGeometry::default();
        Self {
            width: geometry.width,
            height: geometry.height,
            color_format: DEFAULT_COLOR_FORMAT.to_string(),
            flip_vertical: true,
            audio: AudioSettings::default(),
        }
    }
}

impl WaterfallConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WaterfallResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| WaterfallError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WaterfallResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| WaterfallError::io(path, e))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Write the config as pretty-printed JSON.
    pub fn to_json(&self) -> WaterfallResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WaterfallError::Other(anyhow::anyhow!("serialize config: {e}")))
    }

    pub fn validate(&self) -> WaterfallResult<()> {
        self.geometry()?;
        self.color_format()?;
        self.audio.validate()
    }

    pub fn geometry(&self) -> WaterfallResult<FrameGeometry> {
        FrameGeometry::new(self.width, self.height)
    }

    pub fn color_format(&self) -> WaterfallResult<ColorFormatSpec> {
        ColorFormatSpec::parse(&self.color_format)
    }
}
