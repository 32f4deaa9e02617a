//! Text preview rendering.
//!
//! Text is wrapped and centered on a transparent canvas, drawn in white from
//! the font's glyph outlines and encoded as PNG.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};
use ttf_parser::{Face, GlyphId};

use crate::error::{AppError, Result};
use crate::fonts::LoadedFont;

const DPI: f32 = 96.0;
const LINE_SPACING: f32 = 1.5;
/// Horizontal room left free across both sides of a line
const WRAP_MARGIN: f32 = 20.0;

/// Output encoding of a preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    #[default]
    Png,
    Base64,
}

/// Canvas and type size of a preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSize {
    pub width: u32,
    pub height: u32,
    /// Type size in points
    pub font_size: f32,
}

impl PreviewSize {
    /// Small previews are banners, large ones are cover images.
    pub fn for_small(small: bool) -> Self {
        if small {
            Self {
                width: 800,
                height: 100,
                font_size: 30.0,
            }
        } else {
            Self {
                width: 400,
                height: 200,
                font_size: 40.0,
            }
        }
    }

    fn pixel_size(&self) -> f32 {
        self.font_size * DPI / 72.0
    }
}

/// Renders `text` with `font` and returns PNG bytes.
pub fn render_preview(font: &LoadedFont, text: &str, small: bool) -> Result<Vec<u8>> {
    render_pixmap(font, text, PreviewSize::for_small(small))?
        .encode_png()
        .map_err(|e| AppError::Render(e.to_string()))
}

/// Standard base64 of an encoded preview.
pub fn encode_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

fn render_pixmap(font: &LoadedFont, text: &str, size: PreviewSize) -> Result<Pixmap> {
    let face = font.face()?;
    let mut pixmap = Pixmap::new(size.width, size.height)
        .ok_or_else(|| AppError::Render("invalid canvas size".to_string()))?;

    let font_height = size.pixel_size();
    let scale = font_height / f32::from(face.units_per_em());
    let canvas_width = size.width as f32;
    let lines = wrap_text(&face, text, scale, canvas_width - WRAP_MARGIN);

    let line_height = font_height * LINE_SPACING;
    let block_height = lines.len() as f32 * line_height - (LINE_SPACING - 1.0) * font_height;
    let top = (size.height as f32 - block_height) / 2.0;

    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    paint.anti_alias = true;

    for (i, line) in lines.iter().enumerate() {
        let baseline = top + font_height + i as f32 * line_height;
        let mut x = (canvas_width - measure(&face, line, scale)) / 2.0;

        for ch in line.chars() {
            let glyph = glyph_for(&face, ch);
            let mut outline = GlyphOutline::new(scale, x, baseline);
            if face.outline_glyph(glyph, &mut outline).is_some() {
                if let Some(path) = outline.finish() {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            x += advance(&face, glyph, scale);
        }
    }

    Ok(pixmap)
}

/// Greedy word wrap; explicit newlines always break. A word wider than
/// `max_width` gets a line of its own.
fn wrap_text(face: &Face<'_>, text: &str, scale: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(face, &candidate, scale) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }

    lines
}

fn glyph_for(face: &Face<'_>, ch: char) -> GlyphId {
    face.glyph_index(ch).unwrap_or(GlyphId(0))
}

fn advance(face: &Face<'_>, glyph: GlyphId, scale: f32) -> f32 {
    f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale
}

fn measure(face: &Face<'_>, text: &str, scale: f32) -> f32 {
    text.chars()
        .map(|ch| advance(face, glyph_for(face, ch), scale))
        .sum()
}

/// Maps font units (Y up) onto canvas pixels (Y down) at a pen position.
struct GlyphOutline {
    builder: PathBuilder,
    scale: f32,
    x_offset: f32,
    baseline: f32,
}

impl GlyphOutline {
    fn new(scale: f32, x_offset: f32, baseline: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            scale,
            x_offset,
            baseline,
        }
    }

    #[inline]
    fn x(&self, x: f32) -> f32 {
        self.x_offset + x * self.scale
    }

    #[inline]
    fn y(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.x(x1), self.y(y1));
        let (x2, y2) = (self.x(x2), self.y(y2));
        let (x, y) = (self.x(x), self.y(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
