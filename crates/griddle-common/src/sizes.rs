//! Batch size lists.
//!
//! A batch arrives either as raw text (one `width,height` pair per line) or
//! as an already structured list. Both become a [`SizeList`] whose entries
//! remember the exact text they were given as, because the archive name is a
//! checksum of that text.

use serde::Deserialize;

use crate::dimensions::{parse_component, Dimensions};

/// Maximum number of size pairs bundled per request.
pub const MAX_BATCH_PAIRS: usize = 10;

/// One requested entry: the text exactly as received and, when it parses,
/// the raw `(width, height)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeEntry {
    pub text: String,
    pub size: Option<(i64, i64)>,
}

impl SizeEntry {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let size = parse_pair(&text);
        Self { text, size }
    }

    /// Clamped dimensions, or `None` when the text is not a usable pair.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.size.map(|(w, h)| Dimensions::clamped(w, h))
    }

    /// True for empty or whitespace-only lines, such as a trailing newline.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A pre-structured size, as accepted in JSON bodies: `[300, 250]` or `"300,250"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Pair([i64; 2]),
    Text(String),
}

/// Ordered list of requested sizes.
///
/// Entries are kept as received, blank and malformed ones included: they
/// count towards the batch limit and take part in the checksum. Unusable
/// entries are only skipped when the archive is bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeList {
    entries: Vec<SizeEntry>,
}

impl SizeList {
    /// Split raw text on `\n`. Line text is not trimmed, so a CRLF line keeps
    /// its `\r` and a trailing newline adds an empty entry.
    pub fn from_text(raw: &str) -> Self {
        Self::from_lines(raw.split('\n'))
    }

    /// Build from individual `width,height` strings. A list made only of
    /// blank lines is empty.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<SizeEntry> = lines
            .into_iter()
            .map(|line| SizeEntry::new(line.as_ref()))
            .collect();
        if entries.iter().all(SizeEntry::is_blank) {
            return Self::default();
        }
        Self { entries }
    }

    /// Structured pairs are written as `w,h`; text items are kept verbatim.
    pub fn from_specs(specs: &[SizeSpec]) -> Self {
        Self::from_lines(specs.iter().map(|spec| match spec {
            SizeSpec::Pair([w, h]) => format!("{},{}", w, h),
            SizeSpec::Text(line) => line.clone(),
        }))
    }

    pub fn entries(&self) -> &[SizeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the first `max` entries. Returns true if anything was dropped.
    pub fn truncate(&mut self, max: usize) -> bool {
        if self.entries.len() > max {
            self.entries.truncate(max);
            true
        } else {
            false
        }
    }

    /// Pipe-joined text of every entry, e.g. `100,100|200,200`.
    pub fn joined(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// CRC-32 of [`joined`](Self::joined).
    ///
    /// This is a weak, format-sensitive fingerprint kept so archive names stay
    /// compatible with existing caches: reordering the list, writing
    /// `100, 100` instead of `100,100` or sending CRLF line endings changes
    /// it, and unrelated lists can collide.
    pub fn checksum(&self) -> u32 {
        crc32fast::hash(self.joined().as_bytes())
    }
}

fn parse_pair(line: &str) -> Option<(i64, i64)> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }
    let (w, h) = text.split_once(',')?;
    let width = parse_component("width", w).ok()?;
    let height = parse_component("height", h).ok()?;
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_lines_and_pairs() {
        let list = SizeList::from_text("100,100\n200,150");
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[1].size, Some((200, 150)));
        assert_eq!(list.entries()[1].text, "200,150");
    }

    #[test]
    fn test_crlf_text_is_kept_for_the_checksum() {
        let list = SizeList::from_text("100,100\r\n200,200");
        assert_eq!(list.entries()[0].text, "100,100\r");
        assert_eq!(list.entries()[0].size, Some((100, 100)));
        assert_eq!(list.joined(), "100,100\r|200,200");
        assert_eq!(list.checksum(), crc32fast::hash(b"100,100\r|200,200"));
        assert_eq!(list.checksum(), 2531816700);
    }

    #[test]
    fn test_trailing_newline_is_an_entry() {
        let plain = SizeList::from_text("100,100\n200,200");
        let trailing = SizeList::from_text("100,100\n200,200\n");
        assert_eq!(trailing.len(), 3);
        assert!(trailing.entries()[2].is_blank());
        assert_eq!(trailing.entries()[2].dimensions(), None);
        assert_ne!(plain.checksum(), trailing.checksum());
    }

    #[test]
    fn test_whitespace_and_blank_lines_change_the_checksum() {
        let loose = SizeList::from_text("100,100 \n\n  200,200\n");
        let tight = SizeList::from_text("100,100\n200,200");
        assert_eq!(loose.len(), 4);
        assert_ne!(loose.checksum(), tight.checksum());
    }

    #[test]
    fn test_malformed_entries_are_kept_unparsed() {
        let list = SizeList::from_text("abc\n300\n300,250\n,");
        assert_eq!(list.len(), 4);
        let parsed: Vec<_> = list.entries().iter().filter_map(|e| e.size).collect();
        assert_eq!(parsed, vec![(300, 250)]);
        assert_eq!(list.joined(), "abc|300|300,250|,");
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(SizeList::from_text("").is_empty());
        assert!(SizeList::from_text("\n \n").is_empty());
        assert!(SizeList::from_specs(&[]).is_empty());
    }

    #[test]
    fn test_truncate() {
        let lines: Vec<String> = (1..=15).map(|i| format!("{},{}", i * 10, i * 10)).collect();
        let mut list = SizeList::from_lines(&lines);
        assert!(list.truncate(MAX_BATCH_PAIRS));
        assert_eq!(list.len(), 10);
        assert_eq!(list.entries()[9].text, "100,100");
        assert!(!list.truncate(MAX_BATCH_PAIRS));
    }

    #[test]
    fn test_truncate_counts_junk_lines() {
        let mut lines: Vec<String> = (1..=10).map(|i| format!("{},{}", i * 10, i * 10)).collect();
        lines.push("junk".into());
        lines.push("1,2,x".into());
        let mut list = SizeList::from_text(&lines.join("\n"));
        assert_eq!(list.len(), 12);
        assert!(list.truncate(MAX_BATCH_PAIRS));
        assert_eq!(list.len(), 10);
        assert_eq!(list.checksum(), crc32fast::hash(lines[..10].join("|").as_bytes()));
    }

    #[test]
    fn test_checksum_is_crc32_of_joined_text() {
        let list = SizeList::from_lines(["100,100", "200,200"]);
        assert_eq!(list.joined(), "100,100|200,200");
        assert_eq!(list.checksum(), crc32fast::hash(b"100,100|200,200"));
    }

    #[test]
    fn test_checksum_is_order_sensitive() {
        let a = SizeList::from_lines(["100,100", "200,200"]);
        let b = SizeList::from_lines(["100,100", "200,200"]);
        let c = SizeList::from_lines(["200,200", "100,100"]);
        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
    }

    #[test]
    fn test_structured_specs_use_canonical_text() {
        let specs = vec![SizeSpec::Pair([100, 100]), SizeSpec::Text("200,200".into())];
        let list = SizeList::from_specs(&specs);
        assert_eq!(list, SizeList::from_lines(["100,100", "200,200"]));
    }

    #[test]
    fn test_entry_dimensions_are_clamped() {
        let list = SizeList::from_text("-50,9000");
        let dims = list.entries()[0].dimensions().unwrap();
        assert_eq!(dims.width, 50);
        assert_eq!(dims.height, 2000);
    }
}
