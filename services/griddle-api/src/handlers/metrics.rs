//! Health check, Prometheus metrics and cache statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics::gauge;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::state::AppState;

/// GET /health - Liveness check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(handle): Extension<PrometheusHandle>,
) -> Response {
    gauge!("griddle_cache_hit_rate_percent").set(state.cache.stats().hit_rate());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub cache_dir: String,
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
    pub hit_rate_percent: f64,
    pub archive_hits: u64,
    pub archive_misses: u64,
    pub archive_failures: u64,
}

/// GET /api/cache/stats - image and archive cache counters since startup
pub async fn cache_stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats();
    let archives = state.archives.stats();
    Json(CacheStatsResponse {
        cache_dir: state.cache.dir().display().to_string(),
        hits: stats.hits.load(Ordering::Relaxed),
        misses: stats.misses.load(Ordering::Relaxed),
        failures: stats.failures.load(Ordering::Relaxed),
        hit_rate_percent: stats.hit_rate(),
        archive_hits: archives.hits.load(Ordering::Relaxed),
        archive_misses: archives.misses.load(Ordering::Relaxed),
        archive_failures: archives.failures.load(Ordering::Relaxed),
    })
}
