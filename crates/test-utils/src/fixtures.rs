//! Common fixtures and file readers for griddle tests.

use std::io::{Cursor, Read};

use tempfile::TempDir;

/// A fresh, empty cache directory removed when dropped.
pub fn temp_cache_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("griddle-cache-")
        .tempdir()
        .expect("failed to create temp cache dir")
}

/// `count` distinct `w,h` lines: `10,10`, `20,20`, ...
pub fn size_lines(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{},{}", i * 10, i * 10)).collect()
}

/// Width and height from a PNG's IHDR chunk.
pub fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    if png.len() < 24 || png[0..8] != [137, 80, 78, 71, 13, 10, 26, 10] || &png[12..16] != b"IHDR" {
        return None;
    }
    let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    Some((w, h))
}

/// An entry read back from a ZIP archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntryInfo {
    pub name: String,
    /// True when the entry uses the `Stored` (uncompressed) method.
    pub stored: bool,
    pub crc32: u32,
    pub data: Vec<u8>,
}

/// Lists the entries of a ZIP archive in directory order, with their data.
///
/// Reads through the `zip` crate so archive tests do not depend on the
/// writer's own view of the format. Entry data is CRC-checked on read.
pub fn zip_entries(zip: &[u8]) -> Option<Vec<ZipEntryInfo>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(zip)).ok()?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).ok()?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).ok()?;
        entries.push(ZipEntryInfo {
            name: file.name().to_string(),
            stored: file.compression() == zip::CompressionMethod::Stored,
            crc32: file.crc32(),
            data,
        });
    }
    Some(entries)
}
