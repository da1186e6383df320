use crate::foundation::error::{WaterfallError, WaterfallResult};
use std::path::Path;
use std::str::FromStr;

fn extension_of(path: &Path) -> WaterfallResult<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .ok_or_else(|| {
            WaterfallError::validation(format!(
                "cannot infer output format: '{}' has no file extension",
                path.display()
            ))
        })
}

/// Still image output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    /// Infer the format from `path`'s extension.
    pub fn from_path(path: &Path) -> WaterfallResult<Self> {
        extension_of(path)?.parse()
    }

    pub(crate) fn as_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            other => Err(WaterfallError::validation(format!(
                "unsupported image format '{other}' (expected png, jpg or bmp)"
            ))),
        }
    }
}

/// Audio output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// Uncompressed PCM, written directly.
    #[default]
    Wav,
    Mp3,
    Flac,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }

    pub fn from_path(path: &Path) -> WaterfallResult<Self> {
        extension_of(path)?.parse()
    }

    /// `ffmpeg` codec used to transcode a WAVE file into this format (`None` for WAVE itself).
    pub(crate) fn ffmpeg_codec(self) -> Option<&'static str> {
        match self {
            Self::Wav => None,
            Self::Mp3 => Some("libmp3lame"),
            Self::Flac => Some("flac"),
        }
    }
}

impl FromStr for AudioFormat {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "wav" | "wave" => Ok(Self::Wav),
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            other => Err(WaterfallError::validation(format!(
                "unsupported audio format '{other}' (expected wav, mp3 or flac)"
            ))),
        }
    }
}

/// Video container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
}

impl VideoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Avi => "avi",
        }
    }

    pub fn from_path(path: &Path) -> WaterfallResult<Self> {
        extension_of(path)?.parse()
    }

    pub(crate) fn video_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mkv => "libx264",
            Self::Avi => "mpeg4",
        }
    }

    pub(crate) fn audio_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mkv => "aac",
            Self::Avi => "libmp3lame",
        }
    }
}

impl FromStr for VideoFormat {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mkv" => Ok(Self::Mkv),
            "avi" => Ok(Self::Avi),
            other => Err(WaterfallError::validation(format!(
                "unsupported video format '{other}' (expected mp4, mkv or avi)"
            ))),
        }
    }
}
