use crate::foundation::error::{WaterfallError, WaterfallResult};
use std::fmt;
use std::str::FromStr;

/// Default channel layout: blue, green, red, one padding byte.
pub const DEFAULT_COLOR_FORMAT: &str = "bgrx";

/// One symbol of the channel-format grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelTag {
    /// `r`: the byte fills the red channel.
    Red,
    /// `g`: the byte fills the green channel.
    Green,
    /// `b`: the byte fills the blue channel.
    Blue,
    /// `w`: the byte fills red, green and blue (grayscale).
    White,
    /// `x`: the byte is consumed but not displayed.
    Unused,
}

impl ChannelTag {
    /// Map a lowercase grammar symbol to its tag.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Self::Red),
            'g' => Some(Self::Green),
            'b' => Some(Self::Blue),
            'w' => Some(Self::White),
            'x' => Some(Self::Unused),
            _ => None,
        }
    }

    /// Grammar symbol for this tag.
    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::White => 'w',
            Self::Unused => 'x',
        }
    }
}

/// Pixel interpretation implied by a format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// A single `w` tag drives all three channels.
    Grayscale,
    /// One each of `r`, `g`, `b`.
    Rgb,
}

/// Parsed, validated channel-format string.
///
/// Invariant: either exactly one `White` and no RGB tags, or exactly one each of `Red`,
/// `Green` and `Blue`. `Unused` tags are unconstrained.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorFormatSpec {
    tags: Vec<ChannelTag>,
    used_color_bytes: usize,
    unused_color_bytes: usize,
    mode: ColorMode,
}

#[derive(Default)]
struct TagCounts {
    red: usize,
    green: usize,
    blue: usize,
    white: usize,
    unused: usize,
}

impl TagCounts {
    fn of(s: &str) -> Self {
        let mut counts = Self::default();
        for c in s.chars() {
            match ChannelTag::from_char(c) {
                Some(ChannelTag::Red) => counts.red += 1,
                Some(ChannelTag::Green) => counts.green += 1,
                Some(ChannelTag::Blue) => counts.blue += 1,
                Some(ChannelTag::White) => counts.white += 1,
                Some(ChannelTag::Unused) => counts.unused += 1,
                None => {}
            }
        }
        counts
    }

    fn rgb(&self) -> usize {
        self.red + self.green + self.blue
    }
}

impl ColorFormatSpec {
    /// Parse a format string such as `"bgrx"` or `"wxx"` (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn parse(format: &str) -> WaterfallResult<Self> {
        let s = format.trim().to_lowercase();
        let counts = TagCounts::of(&s);

        let mode = if counts.white > 0 {
            if counts.rgb() > 0 {
                return Err(WaterfallError::validation(format!(
                    "when using the grayscale mode formatter \"w\", you cannot use any of the \
                     RGB mode formatters \"r\", \"g\", or \"b\" (format string \"{s}\")"
                )));
            }
            if counts.white > 1 {
                return Err(WaterfallError::validation(format!(
                    "exactly 1 white channel format specifier \"w\" needed, but {} were given \
                     in format string \"{s}\"",
                    counts.white
                )));
            }
            ColorMode::Grayscale
        } else {
            if counts.rgb() < 1 {
                return Err(WaterfallError::validation(format!(
                    "a minimum of 1 color format specifier (\"r\", \"g\", \"b\", or \"w\") is \
                     required, but none were given in format string \"{s}\""
                )));
            }
            for (name, symbol, n) in [
                ("red", 'r', counts.red),
                ("green", 'g', counts.green),
                ("blue", 'b', counts.blue),
            ] {
                if n != 1 {
                    return Err(WaterfallError::validation(format!(
                        "exactly 1 {name} channel format specifier \"{symbol}\" required, but \
                         {n} were given in format string \"{s}\""
                    )));
                }
            }
            ColorMode::Rgb
        };

        let tags = s
            .chars()
            .map(|c| {
                ChannelTag::from_char(c).ok_or_else(|| {
                    WaterfallError::validation(format!(
                        "invalid character '{c}' in format string \"{s}\": color formatting \
                         codes only accept \"r\" = red, \"g\" = green, \"b\" = blue, \
                         \"w\" = white, \"x\" = unused"
                    ))
                })
            })
            .collect::<WaterfallResult<Vec<_>>>()?;

        Ok(Self {
            tags,
            used_color_bytes: counts.rgb() + counts.white,
            unused_color_bytes: counts.unused,
            mode,
        })
    }

    /// Return `true` when `format` parses.
    pub fn is_valid(format: &str) -> bool {
        Self::parse(format).is_ok()
    }

    /// Exact inverse of the tag list (lowercase).
    pub fn serialize(&self) -> String {
        self.tags.iter().map(|t| t.as_char()).collect()
    }

    /// Ordered channel tags, one per source byte of a pixel.
    pub fn tags(&self) -> &[ChannelTag] {
        &self.tags
    }

    /// Bytes per pixel that land in a visible channel.
    pub fn used_color_bytes(&self) -> usize {
        self.used_color_bytes
    }

    /// Bytes per pixel that are skipped.
    pub fn unused_color_bytes(&self) -> usize {
        self.unused_color_bytes
    }

    /// Source bytes consumed per pixel.
    pub fn color_bytes(&self) -> usize {
        self.used_color_bytes + self.unused_color_bytes
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }
}

impl Default for ColorFormatSpec {
    fn default() -> Self {
        Self {
            tags: vec![
                ChannelTag::Blue,
                ChannelTag::Green,
                ChannelTag::Red,
                ChannelTag::Unused,
            ],
            used_color_bytes: 3,
            unused_color_bytes: 1,
            mode: ColorMode::Rgb,
        }
    }
}

impl FromStr for ColorFormatSpec {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColorFormatSpec {
    type Error = WaterfallError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ColorFormatSpec> for String {
    fn from(spec: ColorFormatSpec) -> Self {
        spec.serialize()
    }
}

impl fmt::Display for ColorFormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/color_format.rs"]
mod tests;
