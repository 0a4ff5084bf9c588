//! Minimal ZIP container writer.
//!
//! Entries are stored uncompressed (method 0): PNG data is already deflated,
//! so recompressing gains nothing. Every entry carries the fixed DOS timestamp
//! 1980-01-01 00:00, which keeps archives byte-for-byte reproducible.

use std::collections::HashSet;
use std::io::Write;

use griddle_common::{GriddleError, GriddleResult};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

/// Version 2.0: plain stored entries, no ZIP64.
const VERSION: u16 = 20;
const METHOD_STORED: u16 = 0;
const DOS_TIME: u16 = 0;
/// 1980-01-01
const DOS_DATE: u16 = (1 << 5) | 1;

struct CentralEntry {
    name: String,
    crc32: u32,
    size: u32,
    offset: u32,
}

/// Streams a ZIP archive into `W`.
///
/// The central directory is written by [`finish`](Self::finish); an archive
/// that is dropped unfinished is not readable.
pub struct ZipWriter<W: Write> {
    inner: W,
    offset: u64,
    entries: Vec<CentralEntry>,
    names: HashSet<String>,
}

impl<W: Write> ZipWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            offset: 0,
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a stored entry.
    ///
    /// Returns `Ok(false)` without writing anything if an entry with the same
    /// name is already in the archive.
    pub fn add_stored(&mut self, name: &str, data: &[u8]) -> GriddleResult<bool> {
        if self.names.contains(name) {
            return Ok(false);
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(GriddleError::Archive("too many entries".to_string()));
        }
        let name_len = u16::try_from(name.len())
            .map_err(|_| GriddleError::Archive(format!("entry name too long: {}", name.len())))?;
        let size = u32::try_from(data.len())
            .map_err(|_| GriddleError::Archive(format!("entry '{}' exceeds 4 GiB", name)))?;
        let offset = self.offset_u32()?;
        let crc32 = crc32fast::hash(data);

        let mut header = Vec::with_capacity(30 + name.len());
        put_u32(&mut header, LOCAL_HEADER_SIGNATURE);
        put_u16(&mut header, VERSION);
        put_u16(&mut header, 0); // flags
        put_u16(&mut header, METHOD_STORED);
        put_u16(&mut header, DOS_TIME);
        put_u16(&mut header, DOS_DATE);
        put_u32(&mut header, crc32);
        put_u32(&mut header, size); // compressed
        put_u32(&mut header, size); // uncompressed
        put_u16(&mut header, name_len);
        put_u16(&mut header, 0); // extra field length
        header.extend_from_slice(name.as_bytes());

        self.write(&header)?;
        self.write(data)?;

        self.names.insert(name.to_string());
        self.entries.push(CentralEntry {
            name: name.to_string(),
            crc32,
            size,
            offset,
        });
        Ok(true)
    }

    /// Write the central directory and end record, returning the inner writer.
    pub fn finish(mut self) -> GriddleResult<W> {
        let directory_offset = self.offset_u32()?;

        let mut directory = Vec::new();
        for entry in &self.entries {
            put_u32(&mut directory, CENTRAL_HEADER_SIGNATURE);
            put_u16(&mut directory, VERSION); // made by
            put_u16(&mut directory, VERSION); // needed to extract
            put_u16(&mut directory, 0); // flags
            put_u16(&mut directory, METHOD_STORED);
            put_u16(&mut directory, DOS_TIME);
            put_u16(&mut directory, DOS_DATE);
            put_u32(&mut directory, entry.crc32);
            put_u32(&mut directory, entry.size);
            put_u32(&mut directory, entry.size);
            put_u16(&mut directory, entry.name.len() as u16);
            put_u16(&mut directory, 0); // extra field length
            put_u16(&mut directory, 0); // comment length
            put_u16(&mut directory, 0); // disk number start
            put_u16(&mut directory, 0); // internal attributes
            put_u32(&mut directory, 0); // external attributes
            put_u32(&mut directory, entry.offset);
            directory.extend_from_slice(entry.name.as_bytes());
        }
        let directory_size = u32::try_from(directory.len())
            .map_err(|_| GriddleError::Archive("central directory too large".to_string()))?;
        let count = self.entries.len() as u16;

        let mut end = Vec::with_capacity(22);
        put_u32(&mut end, END_OF_CENTRAL_DIR_SIGNATURE);
        put_u16(&mut end, 0); // this disk
        put_u16(&mut end, 0); // disk with central directory
        put_u16(&mut end, count);
        put_u16(&mut end, count);
        put_u32(&mut end, directory_size);
        put_u32(&mut end, directory_offset);
        put_u16(&mut end, 0); // comment length

        self.write(&directory)?;
        self.write(&end)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write(&mut self, bytes: &[u8]) -> GriddleResult<()> {
        self.inner.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    fn offset_u32(&self) -> GriddleResult<u32> {
        u32::try_from(self.offset)
            .map_err(|_| GriddleError::Archive("archive exceeds 4 GiB".to_string()))
    }
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(buf: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
    }

    fn u16_at(buf: &[u8], pos: usize) -> u16 {
        u16::from_le_bytes([buf[pos], buf[pos + 1]])
    }

    #[test]
    fn test_empty_archive_is_just_the_end_record() {
        let bytes = ZipWriter::new(Vec::new()).finish().unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(u32_at(&bytes, 0), END_OF_CENTRAL_DIR_SIGNATURE);
        assert_eq!(u16_at(&bytes, 10), 0);
    }

    #[test]
    fn test_single_entry_layout() {
        let mut zip = ZipWriter::new(Vec::new());
        assert!(zip.add_stored("a.png", b"hello").unwrap());
        let bytes = zip.finish().unwrap();

        assert_eq!(u32_at(&bytes, 0), LOCAL_HEADER_SIGNATURE);
        assert_eq!(u16_at(&bytes, 8), METHOD_STORED);
        assert_eq!(u32_at(&bytes, 14), crc32fast::hash(b"hello"));
        assert_eq!(u32_at(&bytes, 18), 5);
        assert_eq!(u32_at(&bytes, 22), 5);
        assert_eq!(&bytes[30..35], b"a.png");
        assert_eq!(&bytes[35..40], b"hello");

        // Central directory follows the data.
        assert_eq!(u32_at(&bytes, 40), CENTRAL_HEADER_SIGNATURE);
        assert_eq!(u32_at(&bytes, 40 + 42), 0); // local header offset

        let end = bytes.len() - 22;
        assert_eq!(u32_at(&bytes, end), END_OF_CENTRAL_DIR_SIGNATURE);
        assert_eq!(u16_at(&bytes, end + 10), 1);
        assert_eq!(u32_at(&bytes, end + 12), 46 + 5);
        assert_eq!(u32_at(&bytes, end + 16), 40);
    }

    #[test]
    fn test_duplicate_names_are_skipped() {
        let mut zip = ZipWriter::new(Vec::new());
        assert!(zip.add_stored("100x100.png", b"one").unwrap());
        assert!(!zip.add_stored("100x100.png", b"two").unwrap());
        assert!(zip.add_stored("200x200.png", b"three").unwrap());
        assert_eq!(zip.len(), 2);
    }

    #[test]
    fn test_output_is_reproducible() {
        let build = || {
            let mut zip = ZipWriter::new(Vec::new());
            zip.add_stored("x.png", &[1, 2, 3]).unwrap();
            zip.add_stored("y.png", &[4, 5]).unwrap();
            zip.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_archive_reads_back_with_zip_crate() {
        let mut zip = ZipWriter::new(Vec::new());
        zip.add_stored("100x100.png", b"first image").unwrap();
        zip.add_stored("200x150.png", b"second").unwrap();
        let bytes = zip.finish().unwrap();

        let mut archive = ::zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        for (i, (name, data)) in [("100x100.png", &b"first image"[..]), ("200x150.png", &b"second"[..])]
            .into_iter()
            .enumerate()
        {
            let mut file = archive.by_index(i).unwrap();
            assert_eq!(file.name(), name);
            assert_eq!(file.compression(), ::zip::CompressionMethod::Stored);
            assert_eq!(file.crc32(), crc32fast::hash(data));
            let mut read = Vec::new();
            std::io::Read::read_to_end(&mut file, &mut read).unwrap();
            assert_eq!(read, data);
        }
    }
}
