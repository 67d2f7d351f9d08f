//! Text overlay drawing on RGB images.

use image::{Rgb, RgbImage};

use super::font::{glyph, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

const MARGIN: u32 = 10;
const LINE_GAP: u32 = 3;
const BAND_ALPHA: f32 = 0.5;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Glyph scale for an image width. Roughly one pixel per 640 columns.
pub fn text_scale(width: u32) -> u32 {
    (width / 640).max(1)
}

/// Height in pixels of the band needed for `lines` lines at `scale`.
pub fn band_height(lines: usize, scale: u32) -> u32 {
    let line_height = (GLYPH_HEIGHT + LINE_GAP) * scale;
    lines as u32 * line_height + 2 * MARGIN
}

/// Darken a band along the bottom edge and write `lines` into it,
/// left-aligned. Text running past the right edge is clipped.
pub fn draw_caption(image: &mut RgbImage, lines: &[String]) {
    if lines.is_empty() || image.width() == 0 || image.height() == 0 {
        return;
    }
    let scale = text_scale(image.width());
    let band = band_height(lines.len(), scale).min(image.height());
    let top = image.height() - band;

    shade_rect(image, 0, top, image.width(), image.height(), BAND_ALPHA);

    let line_height = (GLYPH_HEIGHT + LINE_GAP) * scale;
    for (i, line) in lines.iter().enumerate() {
        let y = top + MARGIN + i as u32 * line_height;
        draw_text(image, MARGIN, y, line, scale, TEXT_COLOR);
    }
}

/// Blend the rectangle `[left, right) x [top, bottom)` toward black.
fn shade_rect(image: &mut RgbImage, left: u32, top: u32, right: u32, bottom: u32, alpha: f32) {
    let right = right.min(image.width());
    let bottom = bottom.min(image.height());
    let keep = 1.0 - alpha.clamp(0.0, 1.0);

    for y in top..bottom {
        for x in left..right {
            let px = image.get_pixel_mut(x, y);
            for c in px.0.iter_mut() {
                *c = (*c as f32 * keep).round() as u8;
            }
        }
    }
}

fn draw_text(image: &mut RgbImage, mut x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    for ch in text.chars() {
        if x >= image.width() {
            break;
        }
        let rows = glyph(ch);
        for (row, pattern) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    fill_cell(
                        image,
                        x + col * scale,
                        y + row as u32 * scale,
                        scale,
                        color,
                    );
                }
            }
        }
        x += ADVANCE * scale;
    }
}

fn fill_cell(image: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            let (px, py) = (x + dx, y + dy);
            if px < image.width() && py < image.height() {
                image.put_pixel(px, py, color);
            }
        }
    }
}
