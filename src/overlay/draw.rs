use std::sync::Arc;

use image::RgbaImage;
use kurbo::Shape as _;

use crate::{
    foundation::{
        core::{PixelRect, Rgba8},
        error::{QuoteframeError, QuoteframeResult},
    },
    overlay::font::PlacedGlyph,
};

/// Rounded translucent rectangle behind the text.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Panel {
    pub rect: PixelRect,
    pub radius: f64,
    pub color: Rgba8,
}

/// A line of glyphs at an absolute canvas position (top-left of the line box).
#[derive(Clone, Debug)]
pub(crate) struct GlyphLine<'a> {
    pub x: f64,
    pub y: f64,
    pub glyphs: &'a [PlacedGlyph],
}

/// Text drawn in one fill color, optionally ringed by an outline.
#[derive(Clone, Debug)]
pub(crate) struct TextPass<'a> {
    pub lines: Vec<GlyphLine<'a>>,
    pub font_size: f32,
    pub fill: Rgba8,
    pub outline: Option<(Rgba8, u32)>,
}

/// Rasterize `base`, then the panel, then each text pass (outline first) with vello_cpu.
///
/// The result is fully opaque.
pub(crate) fn compose(
    base: &RgbaImage,
    panel: Option<&Panel>,
    texts: &[TextPass<'_>],
    font: Option<&vello_cpu::peniko::FontData>,
) -> QuoteframeResult<RgbaImage> {
    let (width, height) = base.dimensions();
    let w: u16 = width
        .try_into()
        .map_err(|_| QuoteframeError::validation("canvas width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| QuoteframeError::validation("canvas height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(opaque_pixmap(base, w, h)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));

    if let Some(panel) = panel
        && !panel.rect.is_empty()
        && panel.color.a > 0
    {
        let rounded = kurbo::RoundedRect::from_rect(panel.rect.to_kurbo(), panel.radius);
        ctx.set_paint(panel.color.to_peniko());
        ctx.fill_path(&bezpath_to_cpu(&rounded.to_path(0.1)));
    }

    if let Some(font) = font {
        for pass in texts {
            if let Some((color, offset)) = pass.outline
                && offset > 0
            {
                ctx.set_paint(color.to_peniko());
                for (dx, dy) in outline_offsets(offset) {
                    ctx.set_transform(vello_cpu::kurbo::Affine::translate((dx, dy)));
                    draw_glyph_lines(&mut ctx, font, pass);
                }
            }
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(pass.fill.to_peniko());
            draw_glyph_lines(&mut ctx, font, pass);
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_in_place(&mut data);
    // The base covers every pixel at full opacity; anti-aliased edges can still round to 254.
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| QuoteframeError::validation("rendered buffer size mismatch"))
}

fn draw_glyph_lines(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    pass: &TextPass<'_>,
) {
    for line in &pass.lines {
        if line.glyphs.is_empty() {
            continue;
        }
        let (ox, oy) = (line.x as f32, line.y as f32);
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x + ox,
            y: g.y + oy,
        });
        ctx.glyph_run(font)
            .font_size(pass.font_size)
            .fill_glyphs(glyphs);
    }
}

/// The eight neighbours at distance `offset` (axis-aligned and diagonal).
pub(crate) fn outline_offsets(offset: u32) -> [(f64, f64); 8] {
    let o = f64::from(offset);
    [
        (-o, -o),
        (0.0, -o),
        (o, -o),
        (-o, 0.0),
        (o, 0.0),
        (-o, o),
        (0.0, o),
        (o, o),
    ]
}

fn opaque_pixmap(img: &RgbaImage, w: u16, h: u16) -> QuoteframeResult<vello_cpu::Pixmap> {
    let expected = usize::from(w) * usize::from(h) * 4;
    if img.as_raw().len() != expected {
        return Err(QuoteframeError::validation("canvas byte length mismatch"));
    }
    let pixels = img
        .as_raw()
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: 255,
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, false))
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/draw.rs"]
mod tests;
