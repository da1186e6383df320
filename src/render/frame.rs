use crate::foundation::core::FrameGeometry;
use crate::foundation::error::{WaterfallError, WaterfallResult};
use crate::format::color_format::{ChannelTag, ColorFormatSpec};

/// A rendered frame: tightly packed RGB8, row-major, `width * height * 3` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGB {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB8 pixel bytes.
    pub data: Vec<u8>,
}

impl FrameRGB {
    /// All-black frame.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 3],
        }
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub(crate) fn into_image(self) -> WaterfallResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| WaterfallError::validation("frame data size mismatch with width*height*3"))
    }

    pub(crate) fn from_image(img: image::RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
        }
    }
}

/// Render the frame whose first pixel reads `buffer[address]`.
///
/// Pixels are filled row by row, each consuming `spec.color_bytes()` consecutive bytes
/// assigned per tag. Reads past the end of `buffer` yield zero. With `flip_vertical` the row
/// order is reversed (the first source row lands at the bottom).
pub fn synthesize(
    buffer: &[u8],
    address: u64,
    spec: &ColorFormatSpec,
    geometry: FrameGeometry,
    flip_vertical: bool,
) -> FrameRGB {
    let width = geometry.width as usize;
    let height = geometry.height as usize;
    let row_bytes = width * 3;
    let mut out = FrameRGB::black(geometry.width, geometry.height);

    let byte_at = |pos: u64| -> u8 {
        usize::try_from(pos)
            .ok()
            .and_then(|p| buffer.get(p).copied())
            .unwrap_or(0)
    };

    let mut cursor = address;
    for row in 0..height {
        let dst_row = if flip_vertical { height - 1 - row } else { row };
        let dst = &mut out.data[dst_row * row_bytes..(dst_row + 1) * row_bytes];
        for px in dst.chunks_exact_mut(3) {
            for tag in spec.tags() {
                let v = byte_at(cursor);
                match tag {
                    ChannelTag::Red => px[0] = v,
                    ChannelTag::Green => px[1] = v,
                    ChannelTag::Blue => px[2] = v,
                    ChannelTag::White => px.fill(v),
                    ChannelTag::Unused => {}
                }
                cursor = cursor.saturating_add(1);
            }
        }
    }

    debug_assert_eq!(out.data.len(), geometry.rgb_len());
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
