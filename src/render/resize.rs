use crate::foundation::core::Canvas;
use crate::foundation::error::WaterfallResult;
use crate::foundation::math::round_half_even_f64;
use crate::render::frame::FrameRGB;
use image::imageops::{self, FilterType};

/// How a frame is scaled into an export size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPolicy {
    /// Scale to the exact target size, distorting the aspect ratio if needed.
    #[default]
    Stretch,
    /// Preserve the aspect ratio, center, and pad the remaining area with black.
    Letterbox,
}

/// Placement of content letterboxed inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fit {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Largest size with the content's aspect ratio that fits `frame`, centered.
pub(crate) fn fit_to_frame(content: (u32, u32), frame: (u32, u32)) -> Fit {
    let (cw, ch) = (f64::from(content.0), f64::from(content.1.max(1)));
    let (fw, fh) = frame;
    let aspect = cw / ch;

    let height_if_limit_width = round_half_even_f64(f64::from(fw) / aspect) as u32;
    let width_if_limit_height = round_half_even_f64(f64::from(fh) * aspect) as u32;
    let limit_width = height_if_limit_width <= fh;

    let (width, height) = if limit_width {
        (fw, height_if_limit_width)
    } else {
        (width_if_limit_height.min(fw), fh)
    };
    let (width, height) = (width.max(1), height.max(1));

    let centered = |outer: u32, inner: u32| {
        round_half_even_f64(f64::from(outer.saturating_sub(inner)) / 2.0) as u32
    };
    if limit_width {
        Fit {
            width,
            height,
            x: 0,
            y: centered(fh, height),
        }
    } else {
        Fit {
            width,
            height,
            x: centered(fw, width),
            y: 0,
        }
    }
}

/// Nearest-neighbour scale of `frame` into `target` under `policy`.
pub fn resize_frame(
    frame: FrameRGB,
    target: Canvas,
    policy: AspectPolicy,
) -> WaterfallResult<FrameRGB> {
    if frame.width == target.width && frame.height == target.height {
        return Ok(frame);
    }
    let (src_w, src_h) = (frame.width, frame.height);
    let img = frame.into_image()?;

    Ok(match policy {
        AspectPolicy::Stretch => FrameRGB::from_image(imageops::resize(
            &img,
            target.width,
            target.height,
            FilterType::Nearest,
        )),
        AspectPolicy::Letterbox => {
            let fit = fit_to_frame((src_w, src_h), (target.width, target.height));
            let scaled = imageops::resize(&img, fit.width, fit.height, FilterType::Nearest);
            let mut canvas = image::RgbImage::new(target.width, target.height);
            imageops::replace(&mut canvas, &scaled, i64::from(fit.x), i64::from(fit.y));
            FrameRGB::from_image(canvas)
        }
    })
}
