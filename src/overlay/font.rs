use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    foundation::error::{QuoteframeError, QuoteframeResult},
    overlay::style::OverlayStyle,
};

const APPROX_ADVANCE_EM: f64 = 0.5;
const APPROX_ASCENT_EM: f64 = 0.8;
const APPROX_DESCENT_EM: f64 = 0.2;

/// Where a loaded face came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    /// Read from a configured file.
    File(PathBuf),
    /// Copied out of the system font database.
    System,
    /// Handed in by the caller.
    Bytes,
}

/// Font used for measuring and drawing captions.
///
/// Resolved once, ahead of rendering, so the renderer itself never touches the disk.
#[derive(Clone, Debug)]
pub enum FontFace {
    /// Real outline font.
    Loaded {
        /// Raw TTF/OTF/TTC bytes.
        bytes: Arc<Vec<u8>>,
        /// Face index inside a collection.
        index: u32,
        /// Provenance, for diagnostics.
        origin: FontOrigin,
    },
    /// No usable font: fixed metrics, glyphs are not drawn.
    Approximate,
}

impl FontFace {
    /// Configured file, then system sans-serif, then [`FontFace::Approximate`].
    pub fn resolve(style: &OverlayStyle) -> Self {
        if let Some(path) = &style.font_path {
            match Self::from_path(path) {
                Ok(face) => return face,
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "configured font unusable, falling back to system font"
                ),
            }
        }
        if let Some(face) = Self::system_sans_serif() {
            return face;
        }
        tracing::warn!("no usable font found, captions use approximate metrics and are not drawn");
        Self::Approximate
    }

    /// Load a font file.
    pub fn from_path(path: &Path) -> QuoteframeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        let mut face = Self::from_bytes(bytes)?;
        if let Self::Loaded { origin, .. } = &mut face {
            *origin = FontOrigin::File(path.to_path_buf());
        }
        Ok(face)
    }

    /// Wrap font bytes, checking that they hold at least one face.
    pub fn from_bytes(bytes: Vec<u8>) -> QuoteframeResult<Self> {
        if bytes.is_empty() {
            return Err(QuoteframeError::validation("font bytes are empty"));
        }
        let mut probe = parley::FontContext::default();
        let families = probe
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        if families.is_empty() {
            return Err(QuoteframeError::validation(
                "no font families registered from font bytes",
            ));
        }
        Ok(Self::Loaded {
            bytes: Arc::new(bytes),
            index: 0,
            origin: FontOrigin::Bytes,
        })
    }

    /// First sans-serif face in the system font database.
    pub fn system_sans_serif() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            ..usvg::fontdb::Query::default()
        };
        let id = db.query(&query)?;
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        tracing::debug!(faces = db.len(), "resolved system sans-serif font");
        Some(Self::Loaded {
            bytes: Arc::new(bytes),
            index,
            origin: FontOrigin::System,
        })
    }

    /// True when glyphs cannot be drawn.
    pub fn is_approximate(&self) -> bool {
        matches!(self, Self::Approximate)
    }

    pub(crate) fn render_data(&self) -> Option<vello_cpu::peniko::FontData> {
        match self {
            Self::Loaded { bytes, index, .. } => Some(vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                *index,
            )),
            Self::Approximate => None,
        }
    }
}

/// Glyph positioned relative to the top-left corner of its line box.
///
/// `x` is the pen position along the line and `y` the baseline, both in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph id in the face.
    pub id: u32,
    /// Horizontal pen position.
    pub x: f32,
    /// Baseline position.
    pub y: f32,
}

/// One shaped line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedLine {
    /// Source text.
    pub text: String,
    /// Advance width in px.
    pub width: f64,
    /// Line box height (ascent + descent + leading) in px.
    pub height: f64,
    /// Glyphs; empty for approximate metrics.
    pub glyphs: Vec<PlacedGlyph>,
}

/// Shapes single lines at arbitrary sizes. Registers the face once.
pub struct TextMeasurer {
    backend: MeasureBackend,
}

enum MeasureBackend {
    Parley {
        font_ctx: parley::FontContext,
        layout_ctx: parley::LayoutContext<()>,
        family: String,
    },
    Approximate,
}

impl TextMeasurer {
    /// Prepare a measurer for `font`.
    pub fn new(font: &FontFace) -> QuoteframeResult<Self> {
        let backend = match font {
            FontFace::Approximate => MeasureBackend::Approximate,
            FontFace::Loaded { bytes, .. } => {
                let mut font_ctx = parley::FontContext::default();
                let families = font_ctx.collection.register_fonts(
                    parley::fontique::Blob::from(bytes.as_ref().clone()),
                    None,
                );
                let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                    QuoteframeError::validation("no font families registered from font bytes")
                })?;
                let family = font_ctx
                    .collection
                    .family_name(family_id)
                    .ok_or_else(|| QuoteframeError::validation("registered font family has no name"))?
                    .to_string();
                MeasureBackend::Parley {
                    font_ctx,
                    layout_ctx: parley::LayoutContext::new(),
                    family,
                }
            }
        };
        Ok(Self { backend })
    }

    /// Advance of `"x"`, used as the average glyph width when estimating wrap width.
    pub fn avg_glyph_width(&mut self, size_px: f32) -> QuoteframeResult<f64> {
        let w = self.shape_line("x", size_px)?.width;
        if w > 0.0 {
            Ok(w)
        } else {
            Ok(f64::from(size_px) * APPROX_ADVANCE_EM)
        }
    }

    /// Shape `text` as a single unbroken line.
    pub fn shape_line(&mut self, text: &str, size_px: f32) -> QuoteframeResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(QuoteframeError::validation(
                "text size must be finite and > 0",
            ));
        }
        match &mut self.backend {
            MeasureBackend::Approximate => {
                let size = f64::from(size_px);
                Ok(ShapedLine {
                    text: text.to_string(),
                    width: text.chars().count() as f64 * size * APPROX_ADVANCE_EM,
                    height: size * (APPROX_ASCENT_EM + APPROX_DESCENT_EM),
                    glyphs: Vec::new(),
                })
            }
            MeasureBackend::Parley {
                font_ctx,
                layout_ctx,
                family,
            } => {
                let mut builder = layout_ctx.ranged_builder(font_ctx, text, 1.0, true);
                builder.push_default(parley::style::StyleProperty::FontStack(
                    parley::style::FontStack::Source(std::borrow::Cow::Owned(family.clone())),
                ));
                builder.push_default(parley::style::StyleProperty::FontSize(size_px));
                let mut layout: parley::Layout<()> = builder.build(text);
                layout.break_all_lines(None);

                let mut width = 0.0f64;
                let mut height = 0.0f64;
                let mut glyphs = Vec::new();
                for line in layout.lines() {
                    let m = line.metrics();
                    width = width.max(f64::from(m.advance));
                    height += f64::from(m.ascent + m.descent + m.leading);
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        // Pen advance and baseline applied; layout coordinates already
                        // include the offset of later lines.
                        glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        }));
                    }
                }
                Ok(ShapedLine {
                    text: text.to_string(),
                    width,
                    height,
                    glyphs,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/font.rs"]
mod tests;
