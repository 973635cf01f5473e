//! HTTP response building module
//!
//! Builders for the few responses this server produces.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::io;

use crate::storage::{ObjectBody, StoredObject};

/// Body type of every response
pub type ResponseBody = ObjectBody;

/// Headers attached to every download, whatever the key
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/pdf";
pub const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"resume.pdf\"";
pub const DOWNLOAD_CACHE_CONTROL: &str = "no-cache";

/// Stored size of a downloaded object, kept in response extensions for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSize(pub u64);

fn text_body(text: &'static str) -> ResponseBody {
    Full::new(Bytes::from_static(text.as_bytes()))
        .map_err(|never| -> io::Error { match never {} })
        .boxed_unsync()
}

/// Build a 404 with a plain message and no headers of its own
pub fn build_404_response(message: &'static str) -> Response<ResponseBody> {
    let mut response = Response::new(text_body(message));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "text/plain")
        .body(text_body("Internal Server Error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut response = Response::new(text_body("Internal Server Error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

/// Build the 200 download response, streaming the object body through
///
/// The disposition filename is fixed and does not follow the requested key.
pub fn build_download_response(object: StoredObject) -> Response<ResponseBody> {
    let size = object.size();
    let mut response = Response::new(object.into_body());
    if let Some(size) = size {
        response.extensions_mut().insert(ObjectSize(size));
    }
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DOWNLOAD_CONTENT_TYPE));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static(DOWNLOAD_DISPOSITION),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(DOWNLOAD_CACHE_CONTROL));
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_404_has_message_and_no_headers() {
        let response = build_404_response("No url");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().is_empty());
        assert_eq!(body_text(response).await, "No url");
    }

    #[tokio::test]
    async fn test_500_response() {
        let response = build_500_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_download_headers() {
        let body = Full::new(Bytes::from_static(b"%PDF"))
            .map_err(|never| -> std::io::Error { match never {} });
        let response = build_download_response(StoredObject::new(body, Some(4)));

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[CONTENT_DISPOSITION],
            "attachment; filename=\"resume.pdf\""
        );
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(response.extensions().get::<ObjectSize>(), Some(&ObjectSize(4)));
        assert_eq!(body_text(response).await, "%PDF");
    }
}
