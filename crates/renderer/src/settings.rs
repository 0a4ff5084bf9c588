//! Render settings and their per-request overrides.

use serde::Deserialize;

use griddle_common::{GriddleError, GriddleResult};

use crate::color::PaletteColor;
use crate::fonts::FontLibrary;

/// Font file looked up in the fonts directory when none is requested.
pub const DEFAULT_FONT: &str = "OSP-DIN.ttf";

/// Everything that controls how a test image looks.
///
/// `Default` reproduces the stock griddle image. Requests may override any
/// field through [`SettingsOverrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Fine grid spacing in pixels; 0 disables the grid.
    pub grid1_size: u32,
    pub grid1_color: PaletteColor,
    /// Coarse grid spacing in pixels; 0 disables the grid.
    pub grid2_size: u32,
    pub grid2_color: PaletteColor,
    /// Percent insets for the marker boxes, drawn in order.
    pub percent_lines: Vec<u32>,
    pub percent_color: PaletteColor,
    pub centerlines: bool,
    pub crosshair_color: PaletteColor,
    pub background: PaletteColor,
    pub text_color: PaletteColor,
    /// Font file name inside the fonts directory.
    pub font: String,
    /// Draw the `W x H` title.
    pub title: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            grid1_size: 10,
            grid1_color: PaletteColor::Rgba(0, 0, 0, 124),
            grid2_size: 100,
            grid2_color: PaletteColor::Rgba(0, 0, 0, 124),
            percent_lines: vec![5, 10, 15, 20],
            percent_color: PaletteColor::Rgba(255, 255, 255, 40),
            centerlines: true,
            crosshair_color: PaletteColor::Rgba(255, 255, 255, 50),
            background: PaletteColor::Rgba(222, 222, 222, 0),
            text_color: PaletteColor::Rgba(255, 255, 255, 0),
            font: DEFAULT_FONT.to_string(),
            title: true,
        }
    }
}

impl RenderSettings {
    /// Defaults with a different font file.
    pub fn with_font(font: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            ..Self::default()
        }
    }

    /// Stable textual form of every field.
    pub fn canonical(&self) -> String {
        let percents = self
            .percent_lines
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "g1={}:{};g2={}:{};pl={}:{};cl={}:{};bg={};tx={};font={};title={}",
            self.grid1_size,
            self.grid1_color,
            self.grid2_size,
            self.grid2_color,
            percents,
            self.percent_color,
            self.centerlines,
            self.crosshair_color,
            self.background,
            self.text_color,
            self.font,
            self.title,
        )
    }

    /// Suffix distinguishing cache entries rendered with non-base settings.
    ///
    /// Returns `None` when `self` equals `base`, so stock images keep their
    /// plain `{w}x{h}.png` names.
    pub fn fingerprint(&self, base: &RenderSettings) -> Option<String> {
        if self == base {
            None
        } else {
            Some(format!("{:08x}", crc32fast::hash(self.canonical().as_bytes())))
        }
    }

    /// Apply request overrides on top of `self`.
    pub fn apply(&self, overrides: &SettingsOverrides) -> GriddleResult<Self> {
        let mut settings = self.clone();

        if let Some(v) = non_empty(&overrides.grid1_size) {
            settings.grid1_size = parse_size("grid1-size", v)?;
        }
        if let Some(v) = non_empty(&overrides.grid1_color) {
            settings.grid1_color = parse_color("grid1-color", v)?;
        }
        if let Some(v) = non_empty(&overrides.grid2_size) {
            settings.grid2_size = parse_size("grid2-size", v)?;
        }
        if let Some(v) = non_empty(&overrides.grid2_color) {
            settings.grid2_color = parse_color("grid2-color", v)?;
        }
        if let Some(v) = non_empty(&overrides.percent_lines) {
            settings.percent_lines = parse_percent_lines(v)?;
        }
        if let Some(v) = non_empty(&overrides.percent_color) {
            settings.percent_color = parse_color("percent-color", v)?;
        }
        if let Some(v) = non_empty(&overrides.centerlines) {
            settings.centerlines = parse_flag("centerlines", v)?;
        }
        if let Some(v) = non_empty(&overrides.font) {
            FontLibrary::validate_name(v)?;
            settings.font = v.to_string();
        }
        if let Some(v) = non_empty(&overrides.title) {
            settings.title = parse_flag("title", v)?;
        }

        Ok(settings)
    }
}

/// Style parameters accepted on requests, as raw strings.
///
/// Field names follow the request parameter names (`grid1-size`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingsOverrides {
    pub grid1_size: Option<String>,
    pub grid1_color: Option<String>,
    pub grid2_size: Option<String>,
    pub grid2_color: Option<String>,
    pub centerlines: Option<String>,
    pub percent_lines: Option<String>,
    pub percent_color: Option<String>,
    pub font: Option<String>,
    pub title: Option<String>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_size(param: &str, value: &str) -> GriddleResult<u32> {
    value
        .parse::<u32>()
        .map_err(|e| GriddleError::invalid(param, format!("'{}': {}", value, e)))
}

fn parse_color(param: &str, value: &str) -> GriddleResult<PaletteColor> {
    value.parse::<PaletteColor>().map_err(|e| match e {
        GriddleError::InvalidParameter { message, .. } => GriddleError::invalid(param, message),
        other => other,
    })
}

fn parse_flag(param: &str, value: &str) -> GriddleResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GriddleError::invalid(param, format!("'{}' is not a flag", value))),
    }
}

fn parse_percent_lines(value: &str) -> GriddleResult<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let percent = p
                .parse::<u32>()
                .map_err(|e| GriddleError::invalid("percent-lines", format!("'{}': {}", p, e)))?;
            if percent > 100 {
                return Err(GriddleError::invalid(
                    "percent-lines",
                    format!("{} is above 100", percent),
                ));
            }
            Ok(percent)
        })
        .collect()
}
