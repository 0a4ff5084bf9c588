//! Requested image dimensions and their cache naming.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GriddleError, GriddleResult};

/// Largest width or height that will be rendered.
pub const MAX_IMAGE_PIXELS: u32 = 2000;

/// A clamped (width, height) pair.
///
/// Construct through [`Dimensions::clamped`] so that both components are
/// `abs(value)` capped at [`MAX_IMAGE_PIXELS`]. Distinct raw inputs that clamp
/// to the same pair share the same cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn clamped(width: i64, height: i64) -> Self {
        Self {
            width: clamp_component(width),
            height: clamp_component(height),
        }
    }

    /// Zero-area canvases cannot be allocated.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Cache key and the file name exposed to callers: `{width}x{height}.png`.
    pub fn file_name(&self) -> String {
        format!("{}.png", self)
    }

    /// The title drawn in the middle of the image.
    pub fn title(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn clamp_component(value: i64) -> u32 {
    value.unsigned_abs().min(MAX_IMAGE_PIXELS as u64) as u32
}

/// Parse one numeric size component from request text.
///
/// Accepts integers and decimals (truncated toward zero). Signs are kept
/// here; clamping takes the absolute value later.
pub fn parse_component(param: &str, raw: &str) -> GriddleResult<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(GriddleError::invalid(
            param,
            format!("'{}' is not a number", trimmed),
        )),
    }
}

/// First `{digits}x{digits}` run in a path, case-insensitive.
static SIZE_IN_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+)x([0-9]+)").expect("size pattern is valid"));

/// Find the first `{digits}x{digits}` run in a path, case-insensitive.
///
/// `/300x250`, `/img/300X250.png` and `/foo-1024x768-bar` all match. Digit
/// runs too long for `i64` saturate and are clamped like any oversized value.
pub fn parse_size_from_path(path: &str) -> Option<(i64, i64)> {
    let caps = SIZE_IN_PATH.captures(path)?;
    let component = |i: usize| caps[i].parse::<i64>().unwrap_or(i64::MAX);
    Some((component(1), component(2)))
}
