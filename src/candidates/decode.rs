use crate::foundation::error::{QuoteframeError, QuoteframeResult};

/// Decode encoded image bytes into an RGB8 buffer.
///
/// Decode failures are reported as [`QuoteframeError::Fetch`] so the filter treats an
/// undecodable payload exactly like an unreachable URL.
pub fn decode_rgb(bytes: &[u8]) -> QuoteframeResult<image::RgbImage> {
    if bytes.is_empty() {
        return Err(QuoteframeError::fetch("empty image payload"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| QuoteframeError::fetch(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgb8())
}

/// Decode encoded image bytes into an RGBA8 buffer (straight alpha).
pub fn decode_rgba(bytes: &[u8]) -> QuoteframeResult<image::RgbaImage> {
    if bytes.is_empty() {
        return Err(QuoteframeError::fetch("empty image payload"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| QuoteframeError::fetch(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/candidates/decode.rs"]
mod tests;
