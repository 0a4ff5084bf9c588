//! On-disk cache of rendered test images.
//!
//! Files are named `{w}x{h}.png` after the clamped dimensions. Images drawn
//! with non-default settings get a `-{fingerprint}` suffix on the stem so the
//! two never share an entry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tracing::{debug, info, warn};

use griddle_common::{Dimensions, GriddleResult, Notice, Outcome};
use renderer::{Compositor, RenderSettings};

use crate::write_atomic;

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The file was already on disk.
    Hit,
    /// The file was rendered and written by this call.
    Rendered,
    /// Rendering or writing failed; the file may not exist.
    Failed,
}

/// A cache entry location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub path: PathBuf,
    /// Name presented to callers and used inside archives: `{w}x{h}.png`.
    pub file_name: String,
    pub dimensions: Dimensions,
    pub status: CacheStatus,
}

impl CachedFile {
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Lookup statistics.
///
/// All fields are atomic so the service can read them while requests run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub failures: AtomicU64,
}

impl CacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// File cache in front of the [`Compositor`].
///
/// There is no locking: two concurrent misses for the same key both render
/// and both persist identical bytes. Each write goes through a temp file and
/// a rename, so readers never see a partial PNG.
pub struct ImageCache {
    dir: PathBuf,
    compositor: Compositor,
    defaults: RenderSettings,
    stats: CacheStats,
}

impl ImageCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    ///
    /// `defaults` are the settings whose images get plain `{w}x{h}.png` names.
    pub fn new(
        dir: impl Into<PathBuf>,
        compositor: Compositor,
        defaults: RenderSettings,
    ) -> GriddleResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Image cache ready");
        Ok(Self {
            dir,
            compositor,
            defaults,
            stats: CacheStats::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn defaults(&self) -> &RenderSettings {
        &self.defaults
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// On-disk file name for `dims` rendered with `settings`.
    pub fn key_for(&self, dims: Dimensions, settings: &RenderSettings) -> String {
        match settings.fingerprint(&self.defaults) {
            None => dims.file_name(),
            Some(fp) => format!("{}-{}.png", dims, fp),
        }
    }

    pub fn path_for(&self, dims: Dimensions, settings: &RenderSettings) -> PathBuf {
        self.dir.join(self.key_for(dims, settings))
    }

    /// Return the cached image for the clamped size, rendering it on a miss.
    ///
    /// Failures are logged and reported through [`CacheStatus::Failed`];
    /// callers decide based on whether the file exists afterwards.
    pub fn get_or_render(&self, width: i64, height: i64, settings: &RenderSettings) -> CachedFile {
        let dims = Dimensions::clamped(width, height);
        let path = self.path_for(dims, settings);
        let file_name = dims.file_name();

        if path.is_file() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            counter!("griddle_cache_hits_total").increment(1);
            debug!(key = %path.display(), "Cache hit");
            return CachedFile {
                path,
                file_name,
                dimensions: dims,
                status: CacheStatus::Hit,
            };
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        counter!("griddle_cache_misses_total").increment(1);

        let status = match self.render_to(&path, dims, settings) {
            Ok(bytes) => {
                counter!("griddle_renders_total").increment(1);
                info!(size = %dims, bytes, path = %path.display(), "Rendered test image");
                CacheStatus::Rendered
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(size = %dims, error = %e, "Failed to render test image");
                CacheStatus::Failed
            }
        };

        CachedFile {
            path,
            file_name,
            dimensions: dims,
            status,
        }
    }

    /// Single-image request: the cached file, or "Image file does not exist."
    /// when nothing is on disk after the attempt.
    pub fn fetch(&self, width: i64, height: i64, settings: &RenderSettings) -> Outcome<CachedFile> {
        let file = self.get_or_render(width, height, settings);
        if file.exists() {
            Outcome::success(file)
        } else {
            Outcome::failure(Notice::image_missing())
        }
    }

    fn render_to(&self, path: &Path, dims: Dimensions, settings: &RenderSettings) -> GriddleResult<usize> {
        let png = self.compositor.render(dims, settings)?;
        write_atomic(path, &png)?;
        Ok(png.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::FontLibrary;
    use std::sync::Arc;

    fn cache(dir: &Path) -> ImageCache {
        let fonts = Arc::new(FontLibrary::new("/nonexistent-griddle-fonts", "none.ttf"));
        ImageCache::new(dir, Compositor::new(fonts), RenderSettings::default()).unwrap()
    }

    #[test]
    fn test_default_settings_use_plain_key() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache(tmp.path());
        let dims = Dimensions::clamped(300, 250);
        assert_eq!(cache.key_for(dims, &RenderSettings::default()), "300x250.png");
    }

    #[test]
    fn test_custom_settings_get_fingerprinted_key() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache(tmp.path());
        let dims = Dimensions::clamped(300, 250);
        let settings = RenderSettings {
            grid1_size: 20,
            ..RenderSettings::default()
        };
        let key = cache.key_for(dims, &settings);
        assert!(key.starts_with("300x250-"));
        assert!(key.ends_with(".png"));
        assert_eq!(key.len(), "300x250-".len() + 8 + ".png".len());
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        stats.hits.fetch_add(3, Ordering::Relaxed);
        stats.misses.fetch_add(1, Ordering::Relaxed);
        assert_eq!(stats.hit_rate(), 75.0);
    }

    #[test]
    fn test_zero_area_is_reported_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache(tmp.path());
        let outcome = cache.fetch(0, 100, &RenderSettings::default());
        assert!(!outcome.is_success());
        assert_eq!(outcome.notices, vec![Notice::image_missing()]);
        assert_eq!(cache.stats().failures.load(Ordering::Relaxed), 1);
    }
}
