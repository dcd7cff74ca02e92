use image::{RgbaImage, imageops::FilterType};

use crate::{
    effects::{blur::blur_rgba8, composite::fill_over_in_place},
    foundation::{
        core::{PixelRect, Rgba8},
        error::{QuoteframeError, QuoteframeResult},
    },
    overlay::style::Backdrop,
};

/// Downsampling factor of the blurred backdrop.
const BACKDROP_DOWNSAMPLE: u32 = 8;

/// Where the fitted source landed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Letterbox {
    /// Placed source rectangle.
    pub content: PixelRect,
}

/// Scale `src` to fit inside a `size x size` canvas, centered, filling the borders with `backdrop`.
///
/// The source is never cropped. The result is fully opaque.
pub fn fit_to_canvas(
    src: &RgbaImage,
    size: u32,
    backdrop: &Backdrop,
) -> QuoteframeResult<(RgbaImage, Letterbox)> {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return Err(QuoteframeError::validation("source image is empty"));
    }
    if size == 0 {
        return Err(QuoteframeError::validation("canvas size must be > 0"));
    }

    let scale = f64::from(size) / f64::from(w.max(h));
    let fw = ((f64::from(w) * scale).round() as u32).clamp(1, size);
    let fh = ((f64::from(h) * scale).round() as u32).clamp(1, size);
    let fitted = if (fw, fh) == (w, h) {
        src.clone()
    } else {
        image::imageops::resize(src, fw, fh, FilterType::Lanczos3)
    };

    let mut canvas = match backdrop {
        Backdrop::Solid(color) => solid_canvas(size, *color),
        Backdrop::Blurred => blurred_canvas(src, size)?,
    };

    let x = (size - fw) / 2;
    let y = (size - fh) / 2;
    image::imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
    for px in canvas.pixels_mut() {
        px.0[3] = 255;
    }

    Ok((
        canvas,
        Letterbox {
            content: PixelRect::new(x as i32, y as i32, fw, fh),
        },
    ))
}

fn solid_canvas(size: u32, color: Rgba8) -> RgbaImage {
    RgbaImage::from_pixel(size, size, image::Rgba([color.r, color.g, color.b, 255]))
}

/// Cover-scaled, center-cropped, heavily blurred copy of `src` at `size x size`.
pub fn blurred_canvas(src: &RgbaImage, size: u32) -> QuoteframeResult<RgbaImage> {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 || size == 0 {
        return Err(QuoteframeError::validation(
            "blurred backdrop needs a non-empty source and canvas",
        ));
    }

    let small = (size / BACKDROP_DOWNSAMPLE).max(1);
    // Crop the centered square in source pixels first, so extreme aspect ratios never
    // upscale the long side.
    let side = w.min(h);
    let square = image::imageops::crop_imm(src, (w - side) / 2, (h - side) / 2, side, side);
    let mut opaque = image::imageops::resize(&square.to_image(), small, small, FilterType::Triangle);
    for px in opaque.pixels_mut() {
        px.0[3] = 255;
    }
    let radius = (small / 16).max(2);
    let blurred = blur_rgba8(opaque.as_raw(), small, small, radius, radius as f32 / 2.0)?;
    let small_img = RgbaImage::from_raw(small, small, blurred)
        .ok_or_else(|| QuoteframeError::validation("blurred backdrop buffer size mismatch"))?;

    Ok(image::imageops::resize(
        &small_img,
        size,
        size,
        FilterType::Triangle,
    ))
}

/// Darken the whole canvas with uniform black at `opacity`.
pub fn apply_contrast_layer(canvas: &mut RgbaImage, opacity: f32) -> QuoteframeResult<()> {
    fill_over_in_place(canvas, [0, 0, 0, 255], opacity)
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/canvas.rs"]
mod tests;
