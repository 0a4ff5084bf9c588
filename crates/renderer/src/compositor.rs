//! Image compositor: canvas allocation, layer order and encoding.

use std::sync::Arc;
use std::time::Instant;

use image::{Rgba, RgbaImage};
use imageproc::drawing::Blend;
use tracing::{debug, warn};

use griddle_common::{Dimensions, GriddleError, GriddleResult};

use crate::crosshair::draw_crosshair;
use crate::fonts::FontLibrary;
use crate::grid::draw_grid;
use crate::percent::draw_percent_markers;
use crate::png::encode_png;
use crate::settings::RenderSettings;
use crate::title::draw_title;
use crate::Surface;

/// Resolved colors for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba<u8>,
    pub text: Rgba<u8>,
    pub grid1: Rgba<u8>,
    pub grid2: Rgba<u8>,
    pub percent: Rgba<u8>,
    pub crosshair: Rgba<u8>,
}

impl Palette {
    pub fn resolve(settings: &RenderSettings) -> Self {
        Self {
            background: settings.background.resolve(),
            text: settings.text_color.resolve(),
            grid1: settings.grid1_color.resolve(),
            grid2: settings.grid2_color.resolve(),
            percent: settings.percent_color.resolve(),
            crosshair: settings.crosshair_color.resolve(),
        }
    }
}

/// Draws test images.
///
/// Output depends only on the dimensions, the settings and the font files,
/// so the same inputs always encode to the same bytes.
#[derive(Clone)]
pub struct Compositor {
    fonts: Arc<FontLibrary>,
}

impl Compositor {
    pub fn new(fonts: Arc<FontLibrary>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Draw every layer in order: background, fine grid, coarse grid,
    /// percent markers, crosshair, title.
    pub fn compose(&self, dims: Dimensions, settings: &RenderSettings) -> GriddleResult<RgbaImage> {
        if dims.is_empty() {
            return Err(GriddleError::EmptyCanvas {
                width: dims.width,
                height: dims.height,
            });
        }
        let Dimensions { width, height } = dims;
        let palette = Palette::resolve(settings);
        let font = self.fonts.get(&settings.font);
        if font.is_none() {
            warn!(font = %settings.font, size = %dims, "Rendering without text");
        }

        // Background is written as-is; every later layer alpha-blends onto it.
        let mut surface: Surface = Blend(RgbaImage::from_pixel(width, height, palette.background));

        draw_grid(&mut surface, width, height, settings.grid1_size, palette.grid1);
        draw_grid(&mut surface, width, height, settings.grid2_size, palette.grid2);

        draw_percent_markers(
            &mut surface,
            width,
            height,
            &settings.percent_lines,
            palette.percent,
            font.as_deref(),
        );

        if settings.centerlines {
            draw_crosshair(&mut surface, width, height, palette.crosshair);
        }

        if settings.title {
            if let Some(font) = font.as_deref() {
                draw_title(&mut surface, &dims.title(), palette.text, font, width, height);
            }
        }

        Ok(surface.0)
    }

    /// Compose and encode to PNG bytes.
    pub fn render(&self, dims: Dimensions, settings: &RenderSettings) -> GriddleResult<Vec<u8>> {
        let start = Instant::now();
        let image = self.compose(dims, settings)?;
        let png = encode_png(image.as_raw(), dims.width as usize, dims.height as usize)?;

        let elapsed = start.elapsed();
        metrics::histogram!("griddle_render_duration_seconds").record(elapsed.as_secs_f64());
        debug!(size = %dims, bytes = png.len(), elapsed_ms = elapsed.as_millis() as u64, "Rendered image");
        Ok(png)
    }
}
