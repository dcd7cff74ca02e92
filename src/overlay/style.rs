use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Rgba8,
    error::{QuoteframeError, QuoteframeResult},
};

/// Vertical anchor of the quote block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Centered, nudged slightly upward.
    #[default]
    Center,
    /// Anchored to the top edge.
    Top,
    /// Anchored to the bottom edge.
    Bottom,
}

/// How the letterbox area around a non-square source is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backdrop {
    /// Blurred, cover-scaled copy of the source.
    #[default]
    Blurred,
    /// Flat color.
    Solid(Rgba8),
}

/// Canvas corner a footer is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterCorner {
    /// Bottom-right corner.
    #[default]
    BottomRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Top-right corner.
    TopRight,
    /// Top-left corner.
    TopLeft,
}

/// Small attribution line drawn in a corner of the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FooterStyle {
    /// Footer text; blank disables the footer.
    pub text: String,
    /// Font size as a fraction of the canvas side.
    pub size_fraction: f32,
    /// Anchor corner.
    pub corner: FooterCorner,
    /// Distance from the canvas edges in px.
    pub margin: u32,
    /// Fill color.
    pub color: Rgba8,
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            size_fraction: 0.025,
            corner: FooterCorner::BottomRight,
            margin: 28,
            color: Rgba8::rgba(255, 255, 255, 0xd9),
        }
    }
}

/// Caption styling. Every field has a default so a partial JSON object is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayStyle {
    /// TTF/OTF file to draw with.
    pub font_path: Option<PathBuf>,
    /// Search seed before word-count scaling; `None` uses 6 % of the canvas side.
    #[serde(alias = "font_size")]
    pub base_font_size: Option<f32>,
    /// Search floor in px.
    pub min_font_size: f32,
    /// Search ceiling in px.
    pub max_font_size: f32,
    /// Search step in px.
    pub font_step: f32,
    /// Max block width (and wrap width) as a fraction of the canvas side.
    #[serde(alias = "max_width_pct")]
    pub max_width_fraction: f64,
    /// Max block height as a fraction of the canvas side.
    pub max_height_fraction: f64,
    /// Blocks shorter than this fraction of the canvas grow.
    pub min_height_fraction: f64,
    /// Lower bound on the estimated characters per line.
    pub min_chars_per_line: usize,
    /// Edge offset for top/bottom placement.
    pub padding: u32,
    /// Panel padding around the text block.
    pub box_padding: u32,
    /// Extra px between lines.
    pub line_spacing: u32,
    /// Text fill color.
    pub text_color: Rgba8,
    /// Panel opacity; `0` draws no panel.
    pub box_opacity: f32,
    /// Panel corner radius in px.
    pub corner_radius: f64,
    /// Opacity of the uniform dark layer over the whole canvas.
    pub contrast_opacity: f32,
    /// Outline offset in px; `0` disables the outline.
    pub shadow_offset: u32,
    /// Vertical anchor.
    pub position: Position,
    /// Output side length in px.
    pub canvas_size: u32,
    /// Letterbox fill.
    pub backdrop: Backdrop,
    /// Optional corner footer.
    pub footer: Option<FooterStyle>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_path: None,
            base_font_size: None,
            min_font_size: 24.0,
            max_font_size: 120.0,
            font_step: 2.0,
            max_width_fraction: 0.85,
            max_height_fraction: 0.60,
            min_height_fraction: 0.12,
            min_chars_per_line: 20,
            padding: 40,
            box_padding: 20,
            line_spacing: 6,
            text_color: Rgba8::WHITE,
            box_opacity: 0.48,
            corner_radius: 16.0,
            contrast_opacity: 0.30,
            shadow_offset: 2,
            position: Position::Center,
            canvas_size: 1080,
            backdrop: Backdrop::Blurred,
            footer: None,
        }
    }
}

/// Largest canvas side the rasterizer accepts.
pub const MAX_CANVAS_SIZE: u32 = u16::MAX as u32;

fn unit_interval(name: &str, v: f64) -> QuoteframeResult<()> {
    if !(v.is_finite() && (0.0..=1.0).contains(&v)) {
        return Err(QuoteframeError::validation(format!(
            "overlay {name} must be in [0, 1]"
        )));
    }
    Ok(())
}

impl OverlayStyle {
    /// Reject non-finite or out-of-range values.
    pub fn validate(&self) -> QuoteframeResult<()> {
        if self.canvas_size == 0 || self.canvas_size > MAX_CANVAS_SIZE {
            return Err(QuoteframeError::validation(format!(
                "overlay canvas_size must be in 1..={MAX_CANVAS_SIZE}"
            )));
        }
        let sizes = [self.min_font_size, self.max_font_size, self.font_step];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(QuoteframeError::validation(
                "overlay font sizes and font_step must be finite and > 0",
            ));
        }
        if self.min_font_size > self.max_font_size {
            return Err(QuoteframeError::validation(
                "overlay min_font_size must be <= max_font_size",
            ));
        }
        if let Some(base) = self.base_font_size
            && !(base.is_finite() && base > 0.0)
        {
            return Err(QuoteframeError::validation(
                "overlay base_font_size must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("max_width_fraction", self.max_width_fraction),
            ("max_height_fraction", self.max_height_fraction),
        ] {
            if !(v.is_finite() && v > 0.0 && v <= 1.0) {
                return Err(QuoteframeError::validation(format!(
                    "overlay {name} must be in (0, 1]"
                )));
            }
        }
        unit_interval("min_height_fraction", self.min_height_fraction)?;
        if self.min_height_fraction > self.max_height_fraction {
            return Err(QuoteframeError::validation(
                "overlay min_height_fraction must be <= max_height_fraction",
            ));
        }
        if self.min_chars_per_line == 0 {
            return Err(QuoteframeError::validation(
                "overlay min_chars_per_line must be >= 1",
            ));
        }
        unit_interval("box_opacity", f64::from(self.box_opacity))?;
        unit_interval("contrast_opacity", f64::from(self.contrast_opacity))?;
        if !(self.corner_radius.is_finite() && self.corner_radius >= 0.0) {
            return Err(QuoteframeError::validation(
                "overlay corner_radius must be finite and >= 0",
            ));
        }
        if let Some(footer) = &self.footer {
            if !(footer.size_fraction.is_finite()
                && footer.size_fraction > 0.0
                && footer.size_fraction <= 0.5)
            {
                return Err(QuoteframeError::validation(
                    "overlay footer size_fraction must be in (0, 0.5]",
                ));
            }
        }
        Ok(())
    }

    /// Search seed before word-count scaling.
    pub fn base_size(&self) -> f32 {
        self.base_font_size
            .unwrap_or(self.canvas_size as f32 * 0.06)
    }

    /// Footer settings when one should be drawn.
    pub fn active_footer(&self) -> Option<&FooterStyle> {
        self.footer.as_ref().filter(|f| !f.text.trim().is_empty())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/style.rs"]
mod tests;
