//! HTTP request handlers.
//!
//! - `images`: single PNG requests, pretty URLs and the `GET /` dispatcher
//! - `batch`: ZIP archives of several sizes
//! - `metrics`: health, Prometheus and cache statistics
//! - `common`: response helpers

pub mod batch;
pub mod common;
pub mod images;
pub mod metrics;

pub use batch::{batch_handler, SizesInput};
pub use common::NOTICE_HEADER;
pub use images::{index_handler, pretty_url_handler, usage_response};
pub use metrics::{cache_stats_handler, health_handler, metrics_handler, CacheStatsResponse};
