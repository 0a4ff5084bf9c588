//! Center crosshair.

use image::Rgba;
use imageproc::drawing::draw_line_segment_mut;

use crate::Surface;

/// Center coordinate, rounded half away from zero.
pub fn center(extent: u32) -> u32 {
    (extent as f32 / 2.0).round() as u32
}

pub fn draw_crosshair(surface: &mut Surface, width: u32, height: u32, color: Rgba<u8>) {
    let cx = center(width) as f32;
    let cy = center(height) as f32;
    draw_line_segment_mut(surface, (cx, 0.0), (cx, height as f32), color);
    draw_line_segment_mut(surface, (0.0, cy), (width as f32, cy), color);
}
