use crate::foundation::error::{WaterfallError, WaterfallResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGB;
use crate::render::resize::fit_to_frame;
use anyhow::Context as _;

const WATERMARK_SVG: &[u8] = include_bytes!("../../assets/watermark.svg");

/// Vector watermark overlaid on exports whose job sets the watermark flag.
pub struct Watermark {
    tree: usvg::Tree,
}

impl Watermark {
    /// Load the built-in watermark.
    pub fn builtin() -> WaterfallResult<Self> {
        Self::from_svg(WATERMARK_SVG)
    }

    /// Load a watermark from SVG bytes.
    pub fn from_svg(bytes: &[u8]) -> WaterfallResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse watermark svg")?;
        Ok(Self { tree })
    }

    /// Rasterize the watermark letterboxed into a `width x height` transparent stamp.
    pub fn stamp(&self, width: u32, height: u32) -> WaterfallResult<WatermarkStamp> {
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| WaterfallError::validation("failed to allocate watermark pixmap"))?;

        let size = self.tree.size();
        let (svg_w, svg_h) = (size.width().max(1.0), size.height().max(1.0));
        let fit = fit_to_frame(
            (svg_w.ceil() as u32, svg_h.ceil() as u32),
            (width, height),
        );
        let xform = resvg::tiny_skia::Transform::from_row(
            fit.width as f32 / svg_w,
            0.0,
            0.0,
            fit.height as f32 / svg_h,
            fit.x as f32,
            fit.y as f32,
        );
        resvg::render(&self.tree, xform, &mut pixmap.as_mut());

        Ok(WatermarkStamp {
            width,
            height,
            premul_rgba: pixmap.data().to_vec(),
        })
    }
}

/// A watermark rasterized for one output size.
#[derive(Clone, Debug)]
pub struct WatermarkStamp {
    width: u32,
    height: u32,
    premul_rgba: Vec<u8>,
}

impl WatermarkStamp {
    /// Composite the stamp source-over onto `frame`.
    pub fn apply(&self, frame: &mut FrameRGB) -> WaterfallResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(WaterfallError::validation(format!(
                "watermark size mismatch: stamp {}x{}, frame {}x{}",
                self.width, self.height, frame.width, frame.height
            )));
        }

        for (d, s) in frame
            .data
            .chunks_exact_mut(3)
            .zip(self.premul_rgba.chunks_exact(4))
        {
            let a = u16::from(s[3]);
            if a == 0 {
                continue;
            }
            let inv = 255 - a;
            for (dc, &sc) in d.iter_mut().zip(&s[..3]) {
                let v = u16::from(sc) + mul_div255_u16(u16::from(*dc), inv);
                *dc = v.min(255) as u8;
            }
        }
        Ok(())
    }
}
