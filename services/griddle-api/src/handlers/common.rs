//! Response helpers shared by the image and batch handlers.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;

use griddle_common::{GriddleError, Notice, NoticeKind};

/// Header carrying non-fatal notices on a successful response.
pub const NOTICE_HEADER: HeaderName = HeaderName::from_static("x-griddle-notice");

pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Status for a request that produced no artifact.
pub fn status_for(notices: &[Notice]) -> StatusCode {
    if notices.iter().any(|n| n.kind == NoticeKind::Input) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn record_notices(notices: &[Notice]) {
    for notice in notices {
        counter!("griddle_notices_total", "kind" => notice.kind.as_str()).increment(1);
    }
}

/// Plain text failure response, one notice per line.
pub fn notice_response(notices: &[Notice]) -> Response {
    record_notices(notices);
    let body = notices
        .iter()
        .map(|n| n.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    (
        status_for(notices),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// A bad request caused by an unparseable parameter.
pub fn invalid_request(err: &GriddleError) -> Response {
    notice_response(&[Notice::new(NoticeKind::Input, err.to_string())])
}

/// Successful file download.
///
/// `Content-Disposition` is only set when the caller asked for a download.
/// Notices that did not prevent the artifact go into [`NOTICE_HEADER`].
pub fn file_response(
    data: Vec<u8>,
    content_type: &'static str,
    file_name: &str,
    download: bool,
    notices: &[Notice],
) -> Response {
    record_notices(notices);
    let mut response = Response::new(Body::from(data));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

    if download {
        let disposition = format!("attachment; filename=\"{}\"", file_name);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    if !notices.is_empty() {
        let joined = notices
            .iter()
            .map(|n| n.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if let Ok(value) = HeaderValue::from_str(&joined) {
            headers.insert(NOTICE_HEADER, value);
        }
    }
    response
}

/// Response when a blocking task could not be joined.
pub fn internal_error(message: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_notices() {
        assert_eq!(status_for(&[Notice::no_sizes()]), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&[Notice::too_many_sizes(10), Notice::zip_missing()]),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&[Notice::image_missing()]), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_file_response_headers() {
        let response = file_response(
            vec![1, 2, 3],
            ZIP_CONTENT_TYPE,
            "test_images_1.zip",
            true,
            &[Notice::too_many_sizes(10)],
        );
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"test_images_1.zip\""
        );
        assert_eq!(
            headers[NOTICE_HEADER],
            "Too many size pairs specified. Only 10 allowed per request."
        );
    }

    #[test]
    fn test_inline_response_has_no_disposition() {
        let response = file_response(vec![], PNG_CONTENT_TYPE, "1x1.png", false, &[]);
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
        assert!(response.headers().get(NOTICE_HEADER).is_none());
    }
}
