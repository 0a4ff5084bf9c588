//! griddle HTTP service library.
//!
//! Exposes the router and its parts so integration tests can drive the
//! service without binding a socket.

pub mod handlers;
pub mod params;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        // Images and archives
        .route("/", get(handlers::index_handler))
        .route("/batch", post(handlers::batch_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        // Pretty URLs: /300x250, /banner-728x90.png, ...
        .fallback(handlers::pretty_url_handler)
        // Layer extensions
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
