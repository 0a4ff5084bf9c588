//! File-based storage for rendered test images.
//!
//! Provides:
//! - [`ImageCache`]: one PNG per clamped size, rendered on first request
//! - [`ArchiveBuilder`]: ZIP bundles of cached images for batch requests
//! - [`ZipWriter`]: the stored-entry ZIP container both rely on
//!
//! The cache directory is an append-only, content-addressed store. Existence
//! of a correctly named file is the only state; nothing is ever evicted.

pub mod archive;
pub mod image_cache;
pub mod zip;

pub use archive::{ArchiveBuilder, ArchiveContents, ArchiveFile, ARCHIVE_PREFIX};
pub use image_cache::{CacheStats, CacheStatus, CachedFile, ImageCache};
pub use zip::ZipWriter;

use std::io::Write;
use std::path::Path;

use griddle_common::GriddleResult;

/// Write `data` to `path` through a temp file in the same directory, so
/// readers see either nothing or the complete file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> GriddleResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
