//! Tests for the HTTP surface, driven through the router without a socket.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tempfile::TempDir;
use tower::ServiceExt;

use griddle_api::handlers::NOTICE_HEADER;
use griddle_api::router;
use griddle_api::state::{AppState, ServiceConfig};
use test_utils::{png_dimensions, size_lines, temp_cache_dir, zip_entries};

struct TestApp {
    app: Router,
    cache: TempDir,
}

fn test_app() -> TestApp {
    let cache = temp_cache_dir();
    let config = ServiceConfig {
        cache_dir: cache.path().to_path_buf(),
        fonts_dir: "/nonexistent-griddle-fonts".into(),
        font: "none.ttf".to_string(),
    };
    let state = Arc::new(AppState::new(config).expect("state"));
    let handle = PrometheusBuilder::new().build_recorder().handle();
    TestApp {
        app: router(state, handle),
        cache,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (Response, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap().to_vec();
    (Response::from_parts(parts, Body::empty()), bytes)
}

async fn get(app: &Router, uri: &str) -> (Response, Vec<u8>) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, json: &str) -> (Response, Vec<u8>) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

fn query_sizes(lines: &[String]) -> String {
    lines.join("%0A")
}

// ============================================================================
// Single images
// ============================================================================

#[tokio::test]
async fn test_single_image_is_png() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?w=300&h=250").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    assert_eq!(png_dimensions(&body), Some((300, 250)));
    assert!(t.cache.path().join("300x250.png").is_file());
}

#[tokio::test]
async fn test_width_height_aliases_and_download() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?width=-5000&height=40&download=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"2000x40.png\""
    );
    assert_eq!(png_dimensions(&body), Some((2000, 40)));
}

#[tokio::test]
async fn test_pretty_url() {
    let t = test_app();
    let (response, body) = get(&t.app, "/banners/728X90.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(png_dimensions(&body), Some((728, 90)));

    let (response, body) = get(&t.app, "/123456789012345678901x100").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(png_dimensions(&body), Some((2000, 100)));

    let (response, _) = get(&t.app, "/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zero_area_image_reports_missing_file() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?w=0&h=100").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(String::from_utf8(body).unwrap(), "Image file does not exist.");
}

#[tokio::test]
async fn test_bad_parameters_are_client_errors() {
    let t = test_app();
    let (response, _) = get(&t.app, "/?w=wide&h=100").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (response, body) = get(&t.app, "/?w=100&h=100&grid1-color=red").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("grid1-color"));

    let (response, _) = get(&t.app, "/?w=100&h=100&font=..%2F..%2Fetc%2Fpasswd").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_style_overrides_use_separate_cache_entry() {
    let t = test_app();
    let (plain, plain_body) = get(&t.app, "/?w=120&h=80").await;
    let (styled, styled_body) = get(&t.app, "/?w=120&h=80&centerlines=0&src=ignored").await;
    assert_eq!(plain.status(), StatusCode::OK);
    assert_eq!(styled.status(), StatusCode::OK);
    assert_ne!(plain_body, styled_body);

    let pngs = std::fs::read_dir(t.cache.path())
        .unwrap()
        .filter(|e| {
            let name = e.as_ref().unwrap().file_name();
            name.to_string_lossy().starts_with("120x80")
        })
        .count();
    assert_eq!(pngs, 2);
}

#[tokio::test]
async fn test_no_parameters_shows_usage() {
    let t = test_app();
    let (response, body) = get(&t.app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("sizes"));
}

// ============================================================================
// Batches
// ============================================================================

#[tokio::test]
async fn test_query_batch_returns_zip() {
    let t = test_app();
    let uri = format!("/?download&sizes={}", query_sizes(&size_lines(3)));
    let (response, body) = get(&t.app, &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");

    let expected = format!(
        "attachment; filename=\"test_images_{}.zip\"",
        list_checksum("10,10|20,20|30,30")
    );
    assert_eq!(response.headers()[header::CONTENT_DISPOSITION], expected.as_str());

    let names: Vec<_> = zip_entries(&body).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["10x10.png", "20x20.png", "30x30.png"]);
}

#[tokio::test]
async fn test_json_batch_truncates_with_header_notice() {
    let t = test_app();
    let sizes: Vec<String> = size_lines(15).iter().map(|l| format!("\"{}\"", l)).collect();
    let json = format!("{{\"sizes\": [{}]}}", sizes.join(","));

    let (response, body) = post_json(&t.app, "/batch", &json).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[NOTICE_HEADER],
        "Too many size pairs specified. Only 10 allowed per request."
    );
    assert_eq!(zip_entries(&body).unwrap().len(), 10);
}

#[tokio::test]
async fn test_json_batch_accepts_pairs() {
    let t = test_app();
    let (response, body) = post_json(&t.app, "/batch", r#"{"sizes": [[100, 100], [200, 200]], "download": true}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::CONTENT_DISPOSITION));
    assert_eq!(zip_entries(&body).unwrap().len(), 2);
}

#[tokio::test]
async fn test_blank_sizes_fall_through_to_single_image() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?sizes=&w=100&h=100").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(png_dimensions(&body), Some((100, 100)));

    let (response, body) = get(&t.app, "/?sizes=%20").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("sizes"));
}

#[tokio::test]
async fn test_empty_batch_is_bad_request() {
    let t = test_app();
    let (response, body) = post_json(&t.app, "/batch", r#"{"sizes": []}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "No sizes specified.");

    let (response, _) = post_json(&t.app, "/batch", r#"{"sizes": ["", " "]}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let zips = std::fs::read_dir(t.cache.path())
        .unwrap()
        .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".zip"))
        .count();
    assert_eq!(zips, 0);
}

#[tokio::test]
async fn test_batch_of_empty_images_reports_missing_zip() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?sizes=0,0").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().ends_with("Zip file does not exist."));
}

#[tokio::test]
async fn test_crlf_batch_keeps_line_endings_in_name() {
    let t = test_app();
    let (response, body) = get(&t.app, "/?download&sizes=100,100%0D%0A200,200").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"test_images_2531816700.zip\""
    );
    let names: Vec<_> = zip_entries(&body).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["100x100.png", "200x200.png"]);
}

#[tokio::test]
async fn test_incomplete_batch_reports_missing_image_every_time() {
    let t = test_app();
    for _ in 0..2 {
        let (response, body) = get(&t.app, "/?sizes=0,100%0A80,60").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[NOTICE_HEADER],
            "Image file does not exist: 0x100.png"
        );
        assert_eq!(zip_entries(&body).unwrap().len(), 1);
    }
}

// ============================================================================
// Operations
// ============================================================================

#[tokio::test]
async fn test_health_and_metrics() {
    let t = test_app();
    let (response, body) = get(&t.app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body, b"OK");

    let (response, _) = get(&t.app, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cache_stats_count_hits() {
    let t = test_app();
    get(&t.app, "/?w=64&h=64").await;
    get(&t.app, "/?w=64&h=64").await;

    let (response, body) = get(&t.app, "/api/cache/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hit_rate_percent"], 50.0);
}

#[tokio::test]
async fn test_cache_stats_count_archives_separately() {
    let t = test_app();
    get(&t.app, "/?sizes=64,64").await;
    get(&t.app, "/?sizes=64,64").await;

    let (_, body) = get(&t.app, "/api/cache/stats").await;
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["archive_hits"], 1);
    assert_eq!(stats["archive_misses"], 1);
    assert_eq!(stats["archive_failures"], 0);
    assert_eq!(stats["hits"], 0);
    assert_eq!(stats["misses"], 1);
}

fn list_checksum(joined: &str) -> u32 {
    griddle_common::SizeList::from_lines(joined.split('|')).checksum()
}
