//! Palette colors.
//!
//! Colors are written the way the rendering settings have always been
//! written: a bare gray intensity, an `r,g,b` triple, or an `r,g,b,a`
//! quadruple whose alpha runs from 0 (opaque) to 127 (fully transparent).

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use griddle_common::GriddleError;

/// Largest value on the 7-bit alpha scale.
pub const ALPHA_TRANSPARENT: u8 = 127;

/// A named palette entry before it is resolved against the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteColor {
    /// Gray with equal r, g and b.
    Gray(u8),
    /// Opaque color.
    Rgb(u8, u8, u8),
    /// Alpha-blended color; alpha is 0 (opaque) ..= 127 (transparent).
    Rgba(u8, u8, u8, u8),
}

impl PaletteColor {
    /// Resolve to a concrete 8-bit RGBA pixel value.
    pub fn resolve(&self) -> Rgba<u8> {
        match *self {
            PaletteColor::Gray(v) => Rgba([v, v, v, 255]),
            PaletteColor::Rgb(r, g, b) => Rgba([r, g, b, 255]),
            PaletteColor::Rgba(r, g, b, a) => Rgba([r, g, b, alpha_to_opacity(a)]),
        }
    }
}

/// Convert 0..=127 transparency into 255..=0 opacity.
pub fn alpha_to_opacity(alpha: u8) -> u8 {
    let alpha = alpha.min(ALPHA_TRANSPARENT) as u32;
    ((ALPHA_TRANSPARENT as u32 - alpha) * 255 / ALPHA_TRANSPARENT as u32) as u8
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteColor::Gray(v) => write!(f, "{}", v),
            PaletteColor::Rgb(r, g, b) => write!(f, "{},{},{}", r, g, b),
            PaletteColor::Rgba(r, g, b, a) => write!(f, "{},{},{},{}", r, g, b, a),
        }
    }
}

impl FromStr for PaletteColor {
    type Err = GriddleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GriddleError::invalid("color", format!("'{}': {}", s, e)))?;

        match parts.as_slice() {
            [v] => Ok(PaletteColor::Gray(*v)),
            [r, g, b] => Ok(PaletteColor::Rgb(*r, *g, *b)),
            [r, g, b, a] if *a <= ALPHA_TRANSPARENT => Ok(PaletteColor::Rgba(*r, *g, *b, *a)),
            [_, _, _, a] => Err(GriddleError::invalid(
                "color",
                format!("alpha {} is outside 0..={}", a, ALPHA_TRANSPARENT),
            )),
            _ => Err(GriddleError::invalid(
                "color",
                format!("'{}' needs 1, 3 or 4 components", s),
            )),
        }
    }
}
