//! Measurement grid lines.

use image::Rgba;
use imageproc::drawing::draw_line_segment_mut;

use crate::Surface;

/// Line offsets `spacing, 2*spacing, ...` strictly below `extent`.
///
/// A line exactly on the far edge is never drawn. Spacing 0 yields nothing.
pub fn grid_positions(extent: u32, spacing: u32) -> impl Iterator<Item = u32> {
    let step = spacing.max(1) as usize;
    let end = if spacing == 0 { 0 } else { extent };
    (spacing..end).step_by(step)
}

/// Draw full-height vertical and full-width horizontal lines every `spacing` px.
pub fn draw_grid(surface: &mut Surface, width: u32, height: u32, spacing: u32, color: Rgba<u8>) {
    for x in grid_positions(width, spacing) {
        let x = x as f32;
        draw_line_segment_mut(surface, (x, 0.0), (x, height as f32), color);
    }
    for y in grid_positions(height, spacing) {
        let y = y as f32;
        draw_line_segment_mut(surface, (0.0, y), (width as f32, y), color);
    }
}
