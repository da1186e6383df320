use crate::foundation::error::{WaterfallError, WaterfallResult};
use crate::foundation::math::div_round_half_even;
use std::str::FromStr;

/// Smallest allowed visualization width/height.
pub const MIN_FRAME_DIM: u32 = 4;

/// Absolute 0-based frame index in an exported sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
///
/// Both parts are non-zero; every value goes through [`Fps::new`], deserialization included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawFps")]
pub struct Fps {
    num: u32,
    den: u32,
}

#[derive(serde::Deserialize)]
struct RawFps {
    num: u32,
    den: u32,
}

impl TryFrom<RawFps> for Fps {
    type Error = WaterfallError;

    fn try_from(raw: RawFps) -> Result<Self, Self::Error> {
        Self::new(raw.num, raw.den)
    }
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WaterfallResult<Self> {
        if den == 0 {
            return Err(WaterfallError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(WaterfallError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Numerator (frames).
    pub fn num(self) -> u32 {
        self.num
    }

    /// Denominator (seconds).
    pub fn den(self) -> u32 {
        self.den
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timestamp of frame `f` in milliseconds, `round(f / fps * 1000)`.
    pub fn timestamp_ms(self, f: FrameIndex) -> u64 {
        let num = u128::from(f.0) * 1000 * u128::from(self.den);
        u64::try_from(div_round_half_even(num, u128::from(self.num))).unwrap_or(u64::MAX)
    }

    /// Number of frames covering `duration_ms`, `round(duration_secs * fps)`.
    pub fn frame_count(self, duration_ms: u64) -> u64 {
        let num = u128::from(duration_ms) * u128::from(self.num);
        u64::try_from(div_round_half_even(num, 1000 * u128::from(self.den))).unwrap_or(u64::MAX)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl FromStr for Fps {
    type Err = WaterfallError;

    /// Accepts `"30"` or `"30000/1001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn part(v: &str, what: &str) -> WaterfallResult<u32> {
            v.trim()
                .parse::<u32>()
                .map_err(|e| WaterfallError::validation(format!("invalid fps {what} '{v}': {e}")))
        }

        match s.split_once('/') {
            Some((num, den)) => Self::new(part(num, "numerator")?, part(den, "denominator")?),
            None => Self::new(part(s, "value")?, 1),
        }
    }
}

/// Visualization geometry: pixels per row and rows per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameGeometry {
    /// Width in pixels (>= 4).
    pub width: u32,
    /// Height in pixels (>= 4).
    pub height: u32,
}

impl FrameGeometry {
    /// Create a validated geometry.
    pub fn new(width: u32, height: u32) -> WaterfallResult<Self> {
        if width < MIN_FRAME_DIM {
            return Err(WaterfallError::validation(format!(
                "visualization width must be at least {MIN_FRAME_DIM}, got {width}"
            )));
        }
        if height < MIN_FRAME_DIM {
            return Err(WaterfallError::validation(format!(
                "visualization height must be at least {MIN_FRAME_DIM}, got {height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Byte length of one RGB frame of this geometry.
    pub fn rgb_len(self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 48,
            height: 48,
        }
    }
}

/// Output canvas dimensions in pixels (export resize target).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated, non-empty canvas.
    pub fn new(width: u32, height: u32) -> WaterfallResult<Self> {
        if width == 0 || height == 0 {
            return Err(WaterfallError::validation(format!(
                "output size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Canvas {
    type Err = WaterfallError;

    /// Accepts `"1920x1080"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| WaterfallError::validation(format!("invalid size '{s}', expected WxH")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|e| WaterfallError::validation(format!("invalid width in '{s}': {e}")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|e| WaterfallError::validation(format!("invalid height in '{s}': {e}")))?;
        Self::new(w, h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
