use crate::foundation::{
    error::{QuoteframeError, QuoteframeResult},
    math::{mul_div255, opacity_u8},
};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over compositing of premultiplied pixels with an extra layer opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite a uniform color over every pixel of `dst` (RGBA8, opaque or premultiplied).
pub fn fill_over_in_place(dst: &mut [u8], color: PremulRgba8, opacity: f32) -> QuoteframeResult<()> {
    if !dst.len().is_multiple_of(4) {
        return Err(QuoteframeError::validation(
            "fill_over_in_place expects an rgba8 buffer",
        ));
    }
    if opacity_u8(opacity) == 0 {
        return Ok(());
    }
    for d in dst.chunks_exact_mut(4) {
        let out = over([d[0], d[1], d[2], d[3]], color, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Mean relative luminance of the RGBA8 pixels inside `rect` (clamped to the buffer).
///
/// Returns `None` when the clamped region is empty.
pub fn mean_luminance(
    rgba: &[u8],
    width: u32,
    height: u32,
    rect: crate::foundation::core::PixelRect,
) -> Option<f64> {
    let r = rect.clamp_to(width, height);
    if r.is_empty() || rgba.len() < (width as usize) * (height as usize) * 4 {
        return None;
    }
    let mut sum = 0.0f64;
    for y in r.y..r.bottom() {
        let row = (y as usize) * (width as usize);
        for x in r.x..r.right() {
            let idx = (row + x as usize) * 4;
            sum += crate::foundation::core::relative_luminance(
                rgba[idx],
                rgba[idx + 1],
                rgba[idx + 2],
            );
        }
    }
    Some(sum / (f64::from(r.width) * f64::from(r.height)))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
