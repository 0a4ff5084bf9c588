//! Per-request outcome: the produced artifact plus any notices collected
//! while producing it.

use std::fmt;

use serde::Serialize;

/// Classification of a request notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Size specification missing or unusable. The request produced nothing.
    Input,
    /// Too many size pairs. The list was truncated and processing continued.
    Capacity,
    /// The expected output file does not exist after the attempt.
    Storage,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Input => "input",
            NoticeKind::Capacity => "capacity",
            NoticeKind::Storage => "storage",
        }
    }
}

/// A human-readable message suitable for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_sizes() -> Self {
        Self::new(NoticeKind::Input, "No sizes specified.")
    }

    pub fn too_many_sizes(max: usize) -> Self {
        Self::new(
            NoticeKind::Capacity,
            format!(
                "Too many size pairs specified. Only {} allowed per request.",
                max
            ),
        )
    }

    /// A batch line that is not a `width,height` pair.
    pub fn invalid_size(entry: &str) -> Self {
        Self::new(
            NoticeKind::Input,
            format!("Invalid size entry: '{}'", entry.trim()),
        )
    }

    pub fn image_missing() -> Self {
        Self::new(NoticeKind::Storage, "Image file does not exist.")
    }

    pub fn zip_missing() -> Self {
        Self::new(NoticeKind::Storage, "Zip file does not exist.")
    }

    pub fn is_warning(&self) -> bool {
        self.kind == NoticeKind::Capacity
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one request: either an artifact, or none, plus ordered notices.
///
/// Returned by value from every request-level operation instead of being
/// accumulated on shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub artifact: Option<T>,
    pub notices: Vec<Notice>,
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self {
            artifact: None,
            notices: Vec::new(),
        }
    }
}

impl<T> Outcome<T> {
    pub fn success(artifact: T) -> Self {
        Self {
            artifact: Some(artifact),
            notices: Vec::new(),
        }
    }

    pub fn failure(notice: Notice) -> Self {
        Self {
            artifact: None,
            notices: vec![notice],
        }
    }

    pub fn push(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn has(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|n| n.kind == kind)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            artifact: self.artifact.map(f),
            notices: self.notices,
        }
    }
}
