//! Application state and shared resources.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use renderer::{Compositor, FontLibrary, RenderSettings, DEFAULT_FONT};
use storage::{ArchiveBuilder, ImageCache};

/// Filesystem locations the service works with.
#[derive(Args, Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding cached PNG and ZIP files
    #[arg(long, env = "GRIDDLE_CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Directory TrueType fonts are loaded from
    #[arg(long, env = "GRIDDLE_FONTS_DIR", default_value = "fonts")]
    pub fonts_dir: PathBuf,

    /// Default font file name inside the fonts directory
    #[arg(long, env = "GRIDDLE_FONT", default_value = DEFAULT_FONT)]
    pub font: String,
}

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,
    pub cache: Arc<ImageCache>,
    pub archives: ArchiveBuilder,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let fonts = Arc::new(FontLibrary::new(&config.fonts_dir, config.font.clone()));
        if fonts.get(&config.font).is_none() {
            warn!(
                font = %config.font,
                dir = %config.fonts_dir.display(),
                "Default font not loadable, images will have no text"
            );
        }

        let defaults = RenderSettings::with_font(config.font.clone());
        let cache = ImageCache::new(&config.cache_dir, Compositor::new(fonts), defaults)
            .with_context(|| format!("cannot use cache dir {}", config.cache_dir.display()))?;
        let cache = Arc::new(cache);
        let archives = ArchiveBuilder::new(Arc::clone(&cache));

        info!(cache_dir = %config.cache_dir.display(), font = %config.font, "Application state ready");
        Ok(Self {
            config,
            cache,
            archives,
        })
    }

    /// Settings every request starts from.
    pub fn defaults(&self) -> &RenderSettings {
        self.cache.defaults()
    }
}
