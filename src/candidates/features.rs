use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Reference area used to compress the resolution score (4000 x 4000).
pub const DEFAULT_SIZE_CAP_AREA: f64 = 4000.0 * 4000.0;

const SATURATION_EPS: f64 = 1e-6;

/// Raw per-image quality features, computed once while filtering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualFeatures {
    /// Variance of the Laplacian response.
    pub sharpness: f64,
    /// Mean HSV-style saturation in `[0, 1]`.
    pub saturation: f64,
    /// `ln(1 + w*h) / ln(1 + cap)`, clamped to `[0, 1]`.
    pub size_score: f64,
}

/// Compute all features for an RGB image and its grayscale conversion.
pub fn extract_features(rgb: &RgbImage, gray: &GrayImage, size_cap_area: f64) -> VisualFeatures {
    let (w, h) = rgb.dimensions();
    VisualFeatures {
        sharpness: laplacian_variance(gray),
        saturation: mean_saturation(rgb),
        size_score: size_score(w, h, size_cap_area),
    }
}

/// Variance of the 4-neighbour Laplacian (`[0,1,0; 1,-4,1; 0,1,0]`) over interior pixels.
///
/// Images without interior pixels (smaller than 3x3) score 0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let px = gray.as_raw();
    let w = w as usize;
    let h = h as usize;

    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;
    for y in 1..h - 1 {
        let row = y * w;
        for x in 1..w - 1 {
            let c = i64::from(px[row + x]);
            let resp = i64::from(px[row + x - 1])
                + i64::from(px[row + x + 1])
                + i64::from(px[row - w + x])
                + i64::from(px[row + w + x])
                - 4 * c;
            sum += resp;
            sum_sq += resp * resp;
        }
    }
    let n = ((w - 2) * (h - 2)) as f64;
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0)
}

/// Mean of `(max - min) / (max + eps)` over all pixels, channels normalized to `[0, 1]`.
pub fn mean_saturation(rgb: &RgbImage) -> f64 {
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for px in rgb.as_raw().chunks_exact(3) {
        let max = px[0].max(px[1]).max(px[2]);
        let min = px[0].min(px[1]).min(px[2]);
        let max_f = f64::from(max) / 255.0;
        let min_f = f64::from(min) / 255.0;
        acc += (max_f - min_f) / (max_f + SATURATION_EPS);
    }
    (acc / (f64::from(w) * f64::from(h))).clamp(0.0, 1.0)
}

/// Log-compressed resolution score; a 4K image is not disproportionately favored over 2K.
pub fn size_score(width: u32, height: u32, cap_area: f64) -> f64 {
    if !(cap_area.is_finite() && cap_area > 0.0) {
        return 0.0;
    }
    let area = f64::from(width) * f64::from(height);
    ((1.0 + area).ln() / (1.0 + cap_area).ln()).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/candidates/features.rs"]
mod tests;
