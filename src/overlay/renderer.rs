use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{
    effects::composite::mean_luminance,
    foundation::{
        core::{PixelRect, Rgba8},
        error::{QuoteframeError, QuoteframeResult},
    },
    overlay::{
        canvas::{apply_contrast_layer, fit_to_canvas},
        draw::{GlyphLine, Panel, TextPass, compose},
        fit::{FitLimits, FitOutcome, FitSearch, wrap_words},
        font::{FontFace, ShapedLine, TextMeasurer},
        style::{FooterCorner, FooterStyle, OverlayStyle, Position},
    },
};

/// Outline tone over light backgrounds.
pub const OUTLINE_DARK: Rgba8 = Rgba8::rgb(0x10, 0x10, 0x10);
/// Outline tone over dark backgrounds.
pub const OUTLINE_LIGHT: Rgba8 = Rgba8::rgb(0xf0, 0xf0, 0xf0);

const CENTER_UPWARD_BIAS: f64 = 0.03;

/// Geometry and typography decisions of one render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayout {
    /// Output side length.
    pub canvas_size: u32,
    /// Chosen font size in px.
    pub font_size: f32,
    /// Wrapped quote lines, top to bottom.
    pub lines: Vec<String>,
    /// Height of one line box in px.
    pub line_height: f64,
    /// Text block bounds.
    pub text_bounds: PixelRect,
    /// Panel bounds, when a panel was drawn.
    pub panel_bounds: Option<PixelRect>,
    /// Footer bounds, when a footer was drawn.
    pub footer_bounds: Option<PixelRect>,
    /// Result of the font-size search.
    pub fit: FitOutcome,
    /// Layouts computed by the font-size search.
    pub iterations: usize,
    /// Outline tone, when an outline was drawn.
    pub outline: Option<Rgba8>,
    /// True when no real font was available and glyphs were skipped.
    pub approximate_metrics: bool,
}

/// Final canvas plus the layout that produced it.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    /// `canvas_size x canvas_size` straight-alpha RGBA (fully opaque).
    pub image: RgbaImage,
    /// Layout decisions.
    pub layout: OverlayLayout,
}

/// Style plus a pre-resolved font.
#[derive(Clone, Debug)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    font: FontFace,
}

impl OverlayRenderer {
    /// Validate `style` and resolve its font (the only IO this type performs).
    pub fn new(style: OverlayStyle) -> QuoteframeResult<Self> {
        style.validate()?;
        let font = FontFace::resolve(&style);
        Ok(Self { style, font })
    }

    /// Use an already resolved font.
    pub fn with_font(style: OverlayStyle, font: FontFace) -> QuoteframeResult<Self> {
        style.validate()?;
        Ok(Self { style, font })
    }

    /// Active style.
    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Active font.
    pub fn font(&self) -> &FontFace {
        &self.font
    }

    /// Render `quote` over `image`.
    pub fn render(&self, image: &RgbaImage, quote: &str) -> QuoteframeResult<RenderedImage> {
        render_overlay(image, quote, &self.style, &self.font)
    }
}

struct TextBlock {
    lines: Vec<ShapedLine>,
    width: f64,
    height: f64,
}

fn layout_block(
    measurer: &mut TextMeasurer,
    quote: &str,
    size: f32,
    style: &OverlayStyle,
) -> QuoteframeResult<TextBlock> {
    let wrap_width = f64::from(style.canvas_size) * style.max_width_fraction;
    let avg = measurer.avg_glyph_width(size)?;
    let chars_per_line = ((wrap_width / avg).floor() as usize).max(style.min_chars_per_line);

    let mut lines = Vec::new();
    for text in wrap_words(quote, chars_per_line) {
        lines.push(measurer.shape_line(&text, size)?);
    }
    let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);
    let spacing = f64::from(style.line_spacing) * lines.len().saturating_sub(1) as f64;
    let height = lines.iter().map(|l| l.height).sum::<f64>() + spacing;
    Ok(TextBlock {
        lines,
        width,
        height,
    })
}

/// Render a quote caption onto `image`.
///
/// Pure: the font must be resolved beforehand. Only an empty quote, an empty image or an
/// invalid style fail; a quote that cannot be fitted is still rendered and the shortfall is
/// reported in [`OverlayLayout::fit`]. With [`FontFace::Approximate`] no glyphs are drawn;
/// a warning is logged and [`OverlayLayout::approximate_metrics`] is set.
#[tracing::instrument(skip(image, quote, style, font), fields(src_w = image.width(), src_h = image.height()))]
pub fn render_overlay(
    image: &RgbaImage,
    quote: &str,
    style: &OverlayStyle,
    font: &FontFace,
) -> QuoteframeResult<RenderedImage> {
    style.validate()?;
    let quote = quote.trim();
    if quote.is_empty() {
        return Err(QuoteframeError::validation("quote must not be empty"));
    }

    if font.is_approximate() {
        tracing::warn!("no font loaded, the caption is laid out but not drawn");
    }

    let size = style.canvas_size;
    let cs = f64::from(size);
    let (mut canvas, _) = fit_to_canvas(image, size, &style.backdrop)?;
    apply_contrast_layer(&mut canvas, style.contrast_opacity)?;

    let mut measurer = TextMeasurer::new(font)?;
    let search = FitSearch::from_style(style)?;
    let limits = FitLimits::from_style(style);
    let seed = search.seed(style.base_size(), quote.split_whitespace().count());
    let fit = search.run(
        seed,
        |s| layout_block(&mut measurer, quote, s, style),
        |b: &TextBlock| limits.classify(b.width, b.height),
    )?;
    if !fit.outcome.is_fitted() {
        tracing::debug!(
            outcome = ?fit.outcome,
            font_size = fit.size,
            block_w = fit.layout.width,
            block_h = fit.layout.height,
            "quote did not fit the size constraints"
        );
    }
    let block = fit.layout;

    let box_padding = f64::from(style.box_padding);
    let bx = (cs - block.width) / 2.0;
    let by = match style.position {
        Position::Center => (cs - block.height) / 2.0 - CENTER_UPWARD_BIAS * cs,
        Position::Top => f64::from(style.padding) + box_padding,
        Position::Bottom => cs - f64::from(style.padding) - box_padding - block.height,
    };
    let bx = bx.clamp(0.0, (cs - block.width).max(0.0));
    let by = by.clamp(0.0, (cs - block.height).max(0.0));
    let text_bounds = PixelRect::new(
        bx.round() as i32,
        by.round() as i32,
        block.width.ceil() as u32,
        block.height.ceil() as u32,
    );

    let panel = (style.box_opacity > 0.0).then(|| Panel {
        rect: text_bounds.inflate(style.box_padding).clamp_to(size, size),
        radius: style.corner_radius,
        color: Rgba8::BLACK.with_opacity(style.box_opacity),
    });

    let panel_factor = if panel.is_some() {
        1.0 - f64::from(style.box_opacity)
    } else {
        1.0
    };
    let outline = (style.shadow_offset > 0).then(|| {
        outline_tone(mean_luminance(canvas.as_raw(), size, size, text_bounds).unwrap_or(0.0) * panel_factor)
    });

    let footer_line = match style.active_footer() {
        Some(footer) => Some((footer, layout_footer(&mut measurer, footer, size)?)),
        None => None,
    };

    let mut glyph_lines = Vec::with_capacity(block.lines.len());
    let mut cursor = by;
    for line in &block.lines {
        glyph_lines.push(GlyphLine {
            x: bx + (block.width - line.width) / 2.0,
            y: cursor,
            glyphs: &line.glyphs,
        });
        cursor += line.height + f64::from(style.line_spacing);
    }

    let mut passes = vec![TextPass {
        lines: glyph_lines,
        font_size: fit.size,
        fill: style.text_color,
        outline: outline.map(|c| (c, style.shadow_offset)),
    }];

    let mut footer_bounds = None;
    if let Some((footer, (line, font_size, bounds))) = &footer_line {
        let tone = outline_tone(mean_luminance(canvas.as_raw(), size, size, *bounds).unwrap_or(0.0));
        passes.push(TextPass {
            lines: vec![GlyphLine {
                x: f64::from(bounds.x),
                y: f64::from(bounds.y),
                glyphs: &line.glyphs,
            }],
            font_size: *font_size,
            fill: footer.color,
            outline: (style.shadow_offset > 0).then_some((tone, style.shadow_offset.div_ceil(2))),
        });
        footer_bounds = Some(*bounds);
    }

    let font_data = font.render_data();
    let rendered = compose(&canvas, panel.as_ref(), &passes, font_data.as_ref())?;

    let layout = OverlayLayout {
        canvas_size: size,
        font_size: fit.size,
        lines: block.lines.iter().map(|l| l.text.clone()).collect(),
        line_height: block.lines.first().map(|l| l.height).unwrap_or(0.0),
        text_bounds,
        panel_bounds: panel.map(|p| p.rect),
        footer_bounds,
        fit: fit.outcome,
        iterations: fit.iterations,
        outline,
        approximate_metrics: font.is_approximate(),
    };
    tracing::debug!(
        font_size = layout.font_size,
        lines = layout.lines.len(),
        fit = ?layout.fit,
        "overlay rendered"
    );
    Ok(RenderedImage {
        image: rendered,
        layout,
    })
}

/// Near-black over light backgrounds, near-white over dark ones.
pub fn outline_tone(luminance: f64) -> Rgba8 {
    if luminance >= 0.5 {
        OUTLINE_DARK
    } else {
        OUTLINE_LIGHT
    }
}

fn layout_footer(
    measurer: &mut TextMeasurer,
    footer: &FooterStyle,
    canvas: u32,
) -> QuoteframeResult<(ShapedLine, f32, PixelRect)> {
    let font_size = (canvas as f32 * footer.size_fraction).max(1.0);
    let line = measurer.shape_line(footer.text.trim(), font_size)?;
    let (w, h) = (line.width.ceil() as u32, line.height.ceil() as u32);
    let margin = footer.margin as i32;
    let far_x = canvas as i32 - margin - w as i32;
    let far_y = canvas as i32 - margin - h as i32;
    let (x, y) = match footer.corner {
        FooterCorner::BottomRight => (far_x, far_y),
        FooterCorner::BottomLeft => (margin, far_y),
        FooterCorner::TopRight => (far_x, margin),
        FooterCorner::TopLeft => (margin, margin),
    };
    Ok((line, font_size, PixelRect::new(x.max(0), y.max(0), w, h)))
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/renderer.rs"]
mod tests;
