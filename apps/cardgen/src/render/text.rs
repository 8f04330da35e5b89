//! Glyph rasterization for outline and built-in faces.

use image::{Rgba, RgbaImage};
use rusttype::point;

use crate::layout::builtin_font;
use crate::layout::font_metrics::{ascent, FontFace, FontHandle};
use crate::render::canvas::blend_at;

/// Draws `text` with the top of its line box at `(x, y)`.
pub fn draw_text(img: &mut RgbaImage, font: &FontHandle, x: i32, y: i32, color: Rgba<u8>, text: &str) {
    if text.is_empty() {
        return;
    }
    match &font.face {
        FontFace::Outline { font: face, .. } => {
            let baseline = y as f32 + ascent(font);
            for glyph in face.layout(text, font.scale(), point(x as f32, baseline)) {
                let Some(bb) = glyph.pixel_bounding_box() else {
                    continue;
                };
                glyph.draw(|gx, gy, v| {
                    blend_at(img, gx as i32 + bb.min.x, gy as i32 + bb.min.y, color, v);
                });
            }
        }
        FontFace::Builtin => draw_builtin(img, font.px, x, y, color, text),
    }
}

fn draw_builtin(img: &mut RgbaImage, px: u32, x: i32, y: i32, color: Rgba<u8>, text: &str) {
    let unit = builtin_font::unit(px as f32);
    let top = y as f32 + builtin_font::TOP_OFFSET_UNITS * unit;

    for (i, ch) in text.chars().enumerate() {
        let origin = x as f32 + i as f32 * builtin_font::ADVANCE_UNITS * unit;
        for (col, bits) in builtin_font::glyph(ch).iter().enumerate() {
            for row in 0..builtin_font::GLYPH_ROWS {
                if bits & (1u8 << row) == 0 {
                    continue;
                }
                let x0 = (origin + col as f32 * unit).round() as i32;
                let x1 = (origin + (col + 1) as f32 * unit).round() as i32;
                let y0 = (top + row as f32 * unit).round() as i32;
                let y1 = (top + (row + 1) as f32 * unit).round() as i32;
                for cy in y0..y1.max(y0 + 1) {
                    for cx in x0..x1.max(x0 + 1) {
                        blend_at(img, cx, cy, color, 1.0);
                    }
                }
            }
        }
    }
}
