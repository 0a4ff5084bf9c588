//! Percent marker boxes.
//!
//! Each marker is a rectangle inset from every edge by a percentage of the
//! canvas width (left/right) and height (top/bottom), labelled `{p}%` just
//! inside its top-left corner. Percentages of 50 or more produce inverted
//! boxes; they are drawn exactly as the arithmetic gives them.

use image::Rgba;
use imageproc::drawing::draw_line_segment_mut;
use rusttype::Font;

use crate::fonts::{draw_text_on_baseline, measure_text};
use crate::Surface;

/// Label font size.
pub const LABEL_SIZE: f32 = 10.0;

/// Horizontal gap between the box edge and its label.
const LABEL_INSET: i32 = 2;

/// Box edges for one percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBox {
    pub percent: u32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PercentBox {
    pub fn new(width: u32, height: u32, percent: u32) -> Self {
        let p = percent as f32 / 100.0;
        let fx = width as f32 * p;
        let fy = height as f32 * p;
        Self {
            percent,
            left: fx,
            top: fy,
            right: width as f32 - fx,
            bottom: height as f32 - fy,
        }
    }

    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }

    /// The four sides as (start, end) segments: left, right, top, bottom.
    pub fn sides(&self) -> [((f32, f32), (f32, f32)); 4] {
        [
            ((self.left, self.top), (self.left, self.bottom)),
            ((self.right, self.top), (self.right, self.bottom)),
            ((self.left, self.top), (self.right, self.top)),
            ((self.left, self.bottom), (self.right, self.bottom)),
        ]
    }
}

/// Draw one box per percentage, then its label if a font is available.
pub fn draw_percent_markers(
    surface: &mut Surface,
    width: u32,
    height: u32,
    percents: &[u32],
    color: Rgba<u8>,
    font: Option<&Font<'_>>,
) {
    for &percent in percents {
        let marker = PercentBox::new(width, height, percent);
        for (start, end) in marker.sides() {
            draw_line_segment_mut(surface, start, end, color);
        }

        if let Some(font) = font {
            let label = marker.label();
            let size = measure_text(font, LABEL_SIZE, &label);
            let x = marker.left as i32 + LABEL_INSET;
            let baseline = marker.top as i32 + size.height;
            draw_text_on_baseline(surface, font, LABEL_SIZE, color, x, baseline, &label);
        }
    }
}
