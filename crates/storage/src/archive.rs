//! Batch archives: several cached images bundled into one ZIP.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use griddle_common::{GriddleResult, Notice, NoticeKind, Outcome, SizeList};
use renderer::RenderSettings;

use crate::image_cache::{CacheStats, ImageCache};
use crate::write_atomic;
use crate::zip::ZipWriter;

/// File name prefix of every batch archive.
pub const ARCHIVE_PREFIX: &str = "test_images_";

/// Where an archive's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveContents {
    /// Complete archive stored in the cache directory.
    Cached(PathBuf),
    /// Archive missing some images. Served once and never cached, so the
    /// next request for the same list tries those images again.
    Uncached(Vec<u8>),
}

/// A batch archive produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub file_name: String,
    /// CRC-32 of the pipe-joined size list.
    pub checksum: u32,
    /// False when the archive was already cached.
    pub built: bool,
    pub contents: ArchiveContents,
}

impl ArchiveFile {
    /// Path of the cached archive, if it was cached.
    pub fn path(&self) -> Option<&Path> {
        match &self.contents {
            ArchiveContents::Cached(path) => Some(path.as_path()),
            ArchiveContents::Uncached(_) => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.path().is_some()
    }

    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.contents {
            ArchiveContents::Cached(path) => std::fs::read(path),
            ArchiveContents::Uncached(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Result of packing one size list.
struct Bundle {
    bytes: Vec<u8>,
    entries: usize,
    /// Every parsed size contributed its image.
    complete: bool,
}

/// Builds and caches batch archives on top of an [`ImageCache`].
#[derive(Clone)]
pub struct ArchiveBuilder {
    cache: Arc<ImageCache>,
    stats: Arc<CacheStats>,
}

impl ArchiveBuilder {
    pub fn new(cache: Arc<ImageCache>) -> Self {
        Self {
            cache,
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Archive lookups since startup. Failures count lists that produced no archive.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// `test_images_{checksum}.zip`, with a settings fingerprint before the
    /// extension when `settings` differ from the cache defaults.
    pub fn archive_name(&self, sizes: &SizeList, settings: &RenderSettings) -> String {
        match settings.fingerprint(self.cache.defaults()) {
            None => format!("{}{}.zip", ARCHIVE_PREFIX, sizes.checksum()),
            Some(fp) => format!("{}{}-{}.zip", ARCHIVE_PREFIX, sizes.checksum(), fp),
        }
    }

    /// Return the archive for `sizes`, building it if it is not cached.
    ///
    /// An empty list fails with "No sizes specified." and touches nothing.
    /// Lists longer than `max` entries are cut to their first `max` with a
    /// capacity notice, and the archive is keyed on the truncated list.
    /// Entries that are not a `width,height` pair are skipped with an input
    /// notice; blank lines are skipped silently.
    pub fn get_or_bundle(
        &self,
        mut sizes: SizeList,
        settings: &RenderSettings,
        max: usize,
    ) -> Outcome<ArchiveFile> {
        if sizes.is_empty() {
            return Outcome::failure(Notice::no_sizes());
        }

        let mut outcome = Outcome::default();
        let requested = sizes.len();
        if sizes.truncate(max) {
            warn!(requested, max, "Truncating batch size list");
            outcome.push(Notice::too_many_sizes(max));
        }
        for entry in sizes.entries().iter().filter(|e| e.size.is_none()) {
            if entry.is_blank() {
                debug!("Skipping blank size entry");
            } else {
                warn!(entry = %entry.text.trim(), "Skipping malformed size entry");
                outcome.push(Notice::invalid_size(&entry.text));
            }
        }

        let checksum = sizes.checksum();
        let file_name = self.archive_name(&sizes, settings);
        let path = self.cache.dir().join(&file_name);

        if path.is_file() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            counter!("griddle_archive_hits_total").increment(1);
            debug!(archive = %file_name, "Archive cache hit");
            outcome.artifact = Some(ArchiveFile {
                file_name,
                checksum,
                built: false,
                contents: ArchiveContents::Cached(path),
            });
            return outcome;
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        counter!("griddle_archive_misses_total").increment(1);
        let contents = match self.bundle(&sizes, settings, &mut outcome) {
            Ok(bundle) if bundle.entries == 0 => {
                warn!(archive = %file_name, "No images available, archive not written");
                None
            }
            Ok(bundle) if bundle.complete => match write_atomic(&path, &bundle.bytes) {
                Ok(()) => {
                    counter!("griddle_archives_built_total").increment(1);
                    info!(archive = %file_name, entries = bundle.entries, "Built batch archive");
                    Some(ArchiveContents::Cached(path))
                }
                Err(e) => {
                    warn!(archive = %file_name, error = %e, "Failed to cache batch archive");
                    Some(ArchiveContents::Uncached(bundle.bytes))
                }
            },
            Ok(bundle) => {
                warn!(archive = %file_name, entries = bundle.entries, "Batch archive incomplete, not caching");
                Some(ArchiveContents::Uncached(bundle.bytes))
            }
            Err(e) => {
                warn!(archive = %file_name, error = %e, "Failed to build batch archive");
                None
            }
        };

        match contents {
            Some(contents) => {
                outcome.artifact = Some(ArchiveFile {
                    file_name,
                    checksum,
                    built: true,
                    contents,
                });
            }
            None => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                outcome.push(Notice::zip_missing());
            }
        }
        outcome
    }

    /// Pack the image of every parsed entry. Repeated sizes are stored once.
    fn bundle(
        &self,
        sizes: &SizeList,
        settings: &RenderSettings,
        outcome: &mut Outcome<ArchiveFile>,
    ) -> GriddleResult<Bundle> {
        let mut zip = ZipWriter::new(Vec::new());
        let mut complete = true;

        for entry in sizes.entries() {
            let Some((width, height)) = entry.size else {
                continue;
            };
            let image = self.cache.get_or_render(width, height, settings);
            let data = match std::fs::read(&image.path) {
                Ok(data) => data,
                Err(e) => {
                    debug!(entry = %entry.text.trim(), error = %e, "Image missing from batch");
                    complete = false;
                    outcome.push(Notice::new(
                        NoticeKind::Storage,
                        format!("Image file does not exist: {}", image.file_name),
                    ));
                    continue;
                }
            };
            if !zip.add_stored(&image.file_name, &data)? {
                debug!(entry = %entry.text.trim(), name = %image.file_name, "Skipping repeated size");
            }
        }

        let entries = zip.len();
        Ok(Bundle {
            bytes: zip.finish()?,
            entries,
            complete,
        })
    }
}
