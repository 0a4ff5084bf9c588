//! Centered `W x H` title.

use image::Rgba;
use rusttype::Font;

use crate::fonts::{draw_text_on_baseline, measure_text, TextBox};
use crate::Surface;

/// Title font size for a canvas width; 0 means no title.
///
/// Thresholds are strict: a 90px wide image gets no title, 91px gets size 15.
pub fn title_font_size(width: u32) -> u32 {
    match width {
        w if w > 220 => 40,
        w if w > 170 => 30,
        w if w > 150 => 20,
        w if w > 90 => 15,
        _ => 0,
    }
}

/// Left edge and baseline for centered text.
///
/// The baseline sits at `(height + text height) / 2`, which centers the
/// baseline-anchored box rather than the glyph tops.
pub fn title_origin(width: u32, height: u32, text: TextBox) -> (i32, i32) {
    let x = (width as i32 - text.width) / 2;
    let y = (height as i32 + text.height) / 2;
    (x, y)
}

/// Draw `text` centered on the canvas. Does nothing when the width policy
/// gives size 0.
pub fn draw_title(
    surface: &mut Surface,
    text: &str,
    color: Rgba<u8>,
    font: &Font<'_>,
    width: u32,
    height: u32,
) {
    let size = title_font_size(width);
    if size == 0 {
        return;
    }
    let size = size as f32;
    let text_box = measure_text(font, size, text);
    let (x, baseline) = title_origin(width, height, text_box);
    draw_text_on_baseline(surface, font, size, color, x, baseline, text);
}
