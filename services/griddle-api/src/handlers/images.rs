//! Single image requests and the `GET /` dispatcher.

use std::io;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use griddle_common::{parse_size_from_path, Notice, Outcome};

use super::batch::{serve_batch, SizesInput};
use super::common::{file_response, internal_error, invalid_request, notice_response, PNG_CONTENT_TYPE};
use crate::params::RequestParams;
use crate::state::AppState;

const USAGE: &str = "\
griddle test image generator

GET /?w=300&h=250            single PNG (width/height also accepted)
GET /300x250                 same, size taken from the path
GET /?sizes=300,250%0A728,90 ZIP of several sizes (max 10)
POST /batch                  JSON {\"sizes\": [[300,250], \"728,90\"]}

Options: download, grid1-size, grid1-color, grid2-size, grid2-color,
centerlines, percent-lines, percent-color, font, title
";

/// GET / - batch when `sizes` is non-blank, single image for `w`/`h`, usage otherwise.
#[instrument(skip(state))]
pub async fn index_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<RequestParams>,
) -> Response {
    if let Some(sizes) = params.sizes.clone().filter(|s| !s.trim().is_empty()) {
        return serve_batch(state, &params, SizesInput::Text(sizes)).await;
    }
    if !params.has_size() {
        return usage_response();
    }
    match params.size() {
        Ok((width, height)) => serve_image(state, &params, width, height).await,
        Err(e) => invalid_request(&e),
    }
}

/// Any other GET path: the first `WxH` run in the path selects the size.
#[instrument(skip(state))]
pub async fn pretty_url_handler(
    Extension(state): Extension<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(params): Query<RequestParams>,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    match parse_size_from_path(uri.path()) {
        Some((width, height)) => serve_image(state, &params, width, height).await,
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Render (or reuse) one image and stream it back.
pub async fn serve_image(
    state: Arc<AppState>,
    params: &RequestParams,
    width: i64,
    height: i64,
) -> Response {
    let settings = match state.defaults().apply(&params.style) {
        Ok(settings) => settings,
        Err(e) => return invalid_request(&e),
    };
    let download = params.wants_download();

    let task = tokio::task::spawn_blocking(move || {
        let outcome = state.cache.fetch(width, height, &settings);
        read_artifact(outcome, |file| std::fs::read(&file.path), Notice::image_missing)
    });

    match task.await {
        Ok(Outcome {
            artifact: Some((file, data)),
            notices,
        }) => {
            debug!(file = %file.file_name, status = ?file.status, "Serving image");
            file_response(data, PNG_CONTENT_TYPE, &file.file_name, download, &notices)
        }
        Ok(outcome) => notice_response(&outcome.notices),
        Err(e) => internal_error(&format!("Render task failed: {}", e)),
    }
}

/// Load the artifact's bytes. A file that disappears or cannot be read is
/// reported the same way as one that was never written.
pub(crate) fn read_artifact<T>(
    outcome: Outcome<T>,
    read: impl Fn(&T) -> io::Result<Vec<u8>>,
    missing: impl Fn() -> Notice,
) -> Outcome<(T, Vec<u8>)> {
    let Outcome { artifact, mut notices } = outcome;
    let Some(file) = artifact else {
        return Outcome { artifact: None, notices };
    };
    match read(&file) {
        Ok(data) => Outcome {
            artifact: Some((file, data)),
            notices,
        },
        Err(e) => {
            debug!(error = %e, "Cached file unreadable");
            notices.push(missing());
            Outcome { artifact: None, notices }
        }
    }
}

pub fn usage_response() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        USAGE,
    )
        .into_response()
}
