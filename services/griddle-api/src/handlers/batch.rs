//! Batch archive requests.

use std::sync::Arc;

use axum::{extract::Extension, response::Response, Json};
use tracing::{debug, instrument};

use griddle_common::{Notice, Outcome, SizeList, SizeSpec, MAX_BATCH_PAIRS};
use renderer::SettingsOverrides;

use super::common::{file_response, internal_error, invalid_request, notice_response, ZIP_CONTENT_TYPE};
use super::images::read_artifact;
use crate::params::{BatchRequest, RequestParams};
use crate::state::AppState;

/// Size list as it arrived on the request.
#[derive(Debug, Clone)]
pub enum SizesInput {
    /// Newline separated `w,h` lines from a query string.
    Text(String),
    /// Structured list from a JSON body.
    Specs(Vec<SizeSpec>),
}

impl SizesInput {
    fn into_list(self) -> SizeList {
        match self {
            SizesInput::Text(raw) => SizeList::from_text(&raw),
            SizesInput::Specs(specs) => SizeList::from_specs(&specs),
        }
    }
}

/// POST /batch - archive of the sizes in a JSON body.
#[instrument(skip(state))]
pub async fn batch_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Response {
    let BatchRequest {
        sizes,
        download,
        style,
    } = request;
    build_and_send(state, &style, download, SizesInput::Specs(sizes)).await
}

/// GET /?sizes=... - archive of the sizes in the query string.
pub async fn serve_batch(state: Arc<AppState>, params: &RequestParams, sizes: SizesInput) -> Response {
    build_and_send(state, &params.style, params.wants_download(), sizes).await
}

async fn build_and_send(
    state: Arc<AppState>,
    style: &SettingsOverrides,
    download: bool,
    sizes: SizesInput,
) -> Response {
    let settings = match state.defaults().apply(style) {
        Ok(settings) => settings,
        Err(e) => return invalid_request(&e),
    };

    let task = tokio::task::spawn_blocking(move || {
        let list = sizes.into_list();
        debug!(entries = list.len(), "Bundling batch");
        let outcome = state.archives.get_or_bundle(list, &settings, MAX_BATCH_PAIRS);
        read_artifact(outcome, |archive| archive.read(), Notice::zip_missing)
    });

    match task.await {
        Ok(Outcome {
            artifact: Some((archive, data)),
            notices,
        }) => file_response(data, ZIP_CONTENT_TYPE, &archive.file_name, download, &notices),
        Ok(outcome) => notice_response(&outcome.notices),
        Err(e) => internal_error(&format!("Archive task failed: {}", e)),
    }
}
