//! Error types for the griddle crates.

use thiserror::Error;

/// Result type alias using GriddleError.
pub type GriddleResult<T> = Result<T, GriddleError>;

/// Internal error type for rendering, caching and archiving.
///
/// These never reach the caller directly. Request-level failures are
/// reported as [`Notice`](crate::Notice)s inside an [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum GriddleError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Rendering Errors ===
    #[error("Cannot allocate a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("Failed to load font '{name}': {message}")]
    FontLoad { name: String, message: String },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    // === Storage Errors ===
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GriddleError {
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        GriddleError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by bad request input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GriddleError::InvalidParameter { .. })
    }
}
