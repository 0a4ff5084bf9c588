//! Common types shared by the griddle rendering, storage and service crates.

pub mod dimensions;
pub mod error;
pub mod outcome;
pub mod sizes;

pub use dimensions::{parse_component, parse_size_from_path, Dimensions, MAX_IMAGE_PIXELS};
pub use error::{GriddleError, GriddleResult};
pub use outcome::{Notice, NoticeKind, Outcome};
pub use sizes::{SizeEntry, SizeList, SizeSpec, MAX_BATCH_PAIRS};
