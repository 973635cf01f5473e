//! Request dispatch module
//!
//! Entry point for HTTP request processing: runs the fetch handler, turns
//! store failures into a 500 and writes the access log line.

use crate::handler::fetch;
use crate::http::{self, ObjectSize, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::state::AppState;
use crate::storage::ObjectStore;
use hyper::body::Body;
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// Any method and any path is accepted; only the query string is consulted.
pub async fn handle_request<B, S: ObjectStore>(
    req: Request<B>,
    state: Arc<AppState<S>>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();

    let response = match fetch::fetch_file(req.uri(), &state.store).await {
        Ok(response) => response,
        Err(e) => {
            logger::log_store_error(http::file_param(req.uri()).as_deref(), &e);
            http::build_500_response()
        }
    };

    let logging = &state.config.logging;
    if logging.access_log {
        let entry = build_access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}

/// Collect access log fields from a finished exchange
fn build_access_entry<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .extensions()
        .get::<ObjectSize>()
        .map(|size| size.0)
        .or_else(|| response.body().size_hint().exact());
    entry.file_key = http::file_param(req.uri());
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::memory::MemoryStore;
    use crate::storage::{StoreError, StoredObject};
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    struct UnreachableStore;

    impl ObjectStore for UnreachableStore {
        async fn get(&self, _key: &str) -> Result<Option<StoredObject>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("connection refused")))
        }

        fn describe(&self) -> String {
            "unreachable".to_string()
        }
    }

    fn state<S>(store: S) -> Arc<AppState<S>> {
        let mut config = Config::load_from("/nonexistent/bucket-cdn/config").unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config, store))
    }

    fn peer() -> SocketAddr {
        "10.0.0.7:51234".parse().unwrap()
    }

    fn request(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_found_object_is_served() {
        let store = MemoryStore::new();
        store.insert("report.pdf", "%PDF");
        let response = handle_request(request("/?file=report.pdf"), state(store), peer())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"%PDF");
    }

    #[tokio::test]
    async fn test_any_method_is_accepted() {
        let store = MemoryStore::new();
        store.insert("report.pdf", "%PDF");
        let req = Request::builder()
            .method("POST")
            .uri("/upload?file=report.pdf")
            .body(())
            .unwrap();
        let response = handle_request(req, state(store), peer()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_store_failure_becomes_500() {
        let req = request("/?file=report.pdf");
        let response = handle_request(req, state(UnreachableStore), peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_param_with_failing_store_is_404() {
        let response = handle_request(request("/"), state(UnreachableStore), peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .uri("/?file=report.pdf")
            .version(Version::HTTP_10)
            .header(USER_AGENT, "curl/8.5.0")
            .body(())
            .unwrap();
        let body = http_body_util::Full::new(hyper::body::Bytes::from_static(b"%PDF"))
            .map_err(|never| -> std::io::Error { match never {} });
        let response = http::build_download_response(StoredObject::new(body, Some(4)));

        let entry = build_access_entry(&req, &response, peer(), Instant::now());
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/");
        assert_eq!(entry.query.as_deref(), Some("file=report.pdf"));
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body_bytes, Some(4));
        assert_eq!(entry.file_key.as_deref(), Some("report.pdf"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.5.0"));
        assert_eq!(entry.referer, None);
    }

    #[test]
    fn test_access_entry_for_text_404_uses_size_hint() {
        let req = request("/");
        let response = http::build_404_response("No url");
        let entry = build_access_entry(&req, &response, peer(), Instant::now());
        assert_eq!(entry.status, 404);
        assert_eq!(entry.body_bytes, Some(6));
        assert_eq!(entry.file_key, None);
    }
}
