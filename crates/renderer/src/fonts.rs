//! Font loading and text measurement.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use griddle_common::{GriddleError, GriddleResult};

use crate::Surface;

pub type SharedFont = Arc<Font<'static>>;

/// Fonts loaded on demand from a directory, by plain file name.
///
/// Failed loads are remembered so a missing font is reported once rather than
/// on every render.
pub struct FontLibrary {
    dir: PathBuf,
    default_font: String,
    loaded: RwLock<HashMap<String, Option<SharedFont>>>,
}

impl FontLibrary {
    pub fn new(dir: impl Into<PathBuf>, default_font: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_font: default_font.into(),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Library whose default font is already loaded from `path`.
    pub fn from_file(path: &Path) -> GriddleResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| GriddleError::invalid("font", format!("{:?} has no file name", path)))?
            .to_string();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let library = Self::new(dir, name.clone());
        let font = load_font(path, &name)?;
        library.write_cache(name, Some(Arc::new(font)));
        Ok(library)
    }

    pub fn default_font(&self) -> &str {
        &self.default_font
    }

    /// Reject anything that is not a plain file name inside the fonts dir.
    pub fn validate_name(name: &str) -> GriddleResult<()> {
        let plain = !name.is_empty()
            && !name.contains(|c: char| c == '/' || c == '\\')
            && name != "."
            && name != ".."
            && !name.starts_with('.');
        if plain {
            Ok(())
        } else {
            Err(GriddleError::invalid("font", format!("'{}' is not a font file name", name)))
        }
    }

    /// Look up `name`, falling back to the default font.
    ///
    /// Returns `None` when neither can be loaded; callers skip text then.
    pub fn get(&self, name: &str) -> Option<SharedFont> {
        if let Some(font) = self.get_exact(name) {
            return Some(font);
        }
        if name != self.default_font {
            debug!(font = name, fallback = %self.default_font, "Falling back to default font");
            return self.get_exact(&self.default_font);
        }
        None
    }

    fn get_exact(&self, name: &str) -> Option<SharedFont> {
        if let Some(cached) = self.read_cache(name) {
            return cached;
        }

        let loaded = Self::validate_name(name)
            .and_then(|_| load_font(&self.dir.join(name), name))
            .map(Arc::new);
        let entry = match loaded {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(font = name, dir = %self.dir.display(), error = %e, "Font unavailable, text will be skipped");
                None
            }
        };
        self.write_cache(name.to_string(), entry.clone());
        entry
    }

    fn read_cache(&self, name: &str) -> Option<Option<SharedFont>> {
        let guard = self.loaded.read().unwrap_or_else(|p| p.into_inner());
        guard.get(name).cloned()
    }

    fn write_cache(&self, name: String, font: Option<SharedFont>) {
        let mut guard = self.loaded.write().unwrap_or_else(|p| p.into_inner());
        guard.insert(name, font);
    }
}

fn load_font(path: &Path, name: &str) -> GriddleResult<Font<'static>> {
    let data = std::fs::read(path).map_err(|e| GriddleError::FontLoad {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Font::try_from_vec(data).ok_or_else(|| GriddleError::FontLoad {
        name: name.to_string(),
        message: "not a TrueType font".to_string(),
    })
}

/// Pixel extent of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: i32,
    pub height: i32,
    /// Distance from the top of the drawing box to the baseline.
    pub ascent: i32,
}

pub fn measure_text(font: &Font<'_>, size: f32, text: &str) -> TextBox {
    let scale = Scale::uniform(size);
    let (width, height) = text_size(scale, font, text);
    let ascent = font.v_metrics(scale).ascent.round() as i32;
    TextBox {
        width,
        height,
        ascent,
    }
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline`.
pub fn draw_text_on_baseline(
    surface: &mut Surface,
    font: &Font<'_>,
    size: f32,
    color: Rgba<u8>,
    x: i32,
    baseline: i32,
    text: &str,
) {
    let scale = Scale::uniform(size);
    let ascent = font.v_metrics(scale).ascent.round() as i32;
    draw_text_mut(surface, color, x, baseline - ascent, scale, font, text);
}
