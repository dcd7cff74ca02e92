use std::{io::Cursor, path::Path};

use anyhow::Context as _;
use image::{RgbaImage, codecs::jpeg::JpegEncoder};

use crate::{
    foundation::error::{QuoteframeError, QuoteframeResult},
    overlay::renderer::RenderedImage,
};

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encode as baseline JPEG. Alpha is dropped; rendered canvases are opaque anyway.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> QuoteframeResult<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(QuoteframeError::validation(
            "jpeg quality must be in 1..=100",
        ));
    }
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .context("encode jpeg")?;
    Ok(out)
}

/// Encode as PNG, keeping alpha.
pub fn encode_png(image: &RgbaImage) -> QuoteframeResult<Vec<u8>> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Create the parent directory of `path` when missing.
pub fn ensure_parent_dir(path: &Path) -> QuoteframeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode as JPEG and write to `path`, creating parent directories.
pub fn save_jpeg(image: &RgbaImage, path: &Path, quality: u8) -> QuoteframeResult<()> {
    let bytes = encode_jpeg(image, quality)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

/// Write a UTF-8 text file (JSON reports, manifests), creating parent directories.
pub fn save_text(path: &Path, text: &str) -> QuoteframeResult<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

impl RenderedImage {
    /// [`encode_jpeg`] over the rendered canvas.
    pub fn encode_jpeg(&self, quality: u8) -> QuoteframeResult<Vec<u8>> {
        encode_jpeg(&self.image, quality)
    }

    /// [`encode_png`] over the rendered canvas.
    pub fn encode_png(&self) -> QuoteframeResult<Vec<u8>> {
        encode_png(&self.image)
    }

    /// [`save_jpeg`] over the rendered canvas.
    pub fn save_jpeg(&self, path: &Path, quality: u8) -> QuoteframeResult<()> {
        save_jpeg(&self.image, path, quality)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raster.rs"]
mod tests;
