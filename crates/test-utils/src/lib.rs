//! Shared test utilities for the griddle workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Font discovery for text rendering tests
//! - Skip macros for tests that need a system font
//! - Temporary cache directories
//! - Readers for the PNG and ZIP files the service writes
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;

/// Macro to skip a test if no TrueType font is available.
///
/// Evaluates to the `PathBuf` of a usable font. Set `GRIDDLE_TEST_FONT` to
/// point at a specific file.
///
/// ```ignore
/// use test_utils::require_font;
///
/// #[test]
/// fn test_title_is_drawn() {
///     let font_path = require_font!();
///     // Test code using font_path...
/// }
/// ```
#[macro_export]
macro_rules! require_font {
    () => {{
        match $crate::find_test_font() {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: No TrueType font found. Set GRIDDLE_TEST_FONT.");
                return;
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_cache_dir_exists() {
        let dir = temp_cache_dir();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
