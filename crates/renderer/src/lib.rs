//! Test image rendering.
//!
//! Draws measurement images onto an RGBA canvas:
//! - Fine and coarse grids
//! - Percent marker boxes with labels
//! - Center crosshair
//! - Centered `W x H` title
//!
//! and encodes the result as PNG.

pub mod color;
pub mod compositor;
pub mod crosshair;
pub mod fonts;
pub mod grid;
pub mod percent;
pub mod png;
pub mod settings;
pub mod title;

use image::RgbaImage;
use imageproc::drawing::Blend;

/// Drawing target. Every primitive drawn onto it alpha-blends.
pub type Surface = Blend<RgbaImage>;

pub use color::PaletteColor;
pub use compositor::{Compositor, Palette};
pub use fonts::{measure_text, FontLibrary, SharedFont, TextBox};
pub use settings::{RenderSettings, SettingsOverrides, DEFAULT_FONT};
pub use title::title_font_size;
