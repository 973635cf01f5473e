// HTTP bucket backend
// Fetches objects from a public bucket origin: GET {endpoint}/{key}

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::io;

use super::{ObjectStore, StoreError, StoredObject};

/// Characters escaped in an object key; `/` is kept so nested keys stay paths
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub struct HttpStore {
    endpoint: String,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let uri: Uri = endpoint
            .parse()
            .map_err(|_| StoreError::InvalidEndpoint(endpoint.clone()))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(StoreError::InvalidEndpoint(endpoint));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { endpoint, client })
    }

    fn object_uri(&self, key: &str) -> Result<Uri, StoreError> {
        let encoded = utf8_percent_encode(key, KEY_ENCODE_SET);
        format!("{}/{encoded}", self.endpoint)
            .parse()
            .map_err(|_| StoreError::InvalidKey(key.to_string()))
    }
}

impl ObjectStore for HttpStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        let response = self.client.get(self.object_uri(key)?).await?;

        match response.status() {
            StatusCode::OK => {
                let size = response
                    .headers()
                    .get(hyper::header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                let body = response.into_body().map_err(io::Error::other);
                Ok(Some(StoredObject::new(body, size)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Upstream {
                key: key.to_string(),
                status,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("http bucket at {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use tokio::net::TcpListener;

    async fn origin(
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        let (status, body) = match req.uri().path() {
            "/resumes/report.pdf" => (200, "%PDF report"),
            "/resumes/user%201/resume.pdf" => (200, "%PDF nested"),
            "/resumes/broken.pdf" => (500, "boom"),
            _ => (404, "missing"),
        };
        Ok(Response::builder()
            .status(status)
            .body(Full::new(Bytes::from(body)))
            .unwrap())
    }

    /// Serve `origin` on an ephemeral port and return its base URL
    async fn spawn_origin() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service_fn(origin))
                        .await;
                });
            }
        });
        format!("http://{addr}/resumes/")
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(HttpStore::new("http://127.0.0.1:9000/bucket").is_ok());
        assert!(matches!(
            HttpStore::new("https://bucket.r2.dev"),
            Err(StoreError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpStore::new("not a url"),
            Err(StoreError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_object_uri_encodes_key() {
        let store = HttpStore::new("http://127.0.0.1:9000/bucket/").unwrap();
        assert_eq!(
            store.object_uri("user 1/résumé?.pdf").unwrap().to_string(),
            "http://127.0.0.1:9000/bucket/user%201/r%C3%A9sum%C3%A9%3F.pdf"
        );
    }

    #[test]
    fn test_leading_slash_is_part_of_key() {
        let store = HttpStore::new("http://127.0.0.1:9000/bucket").unwrap();
        let plain = store.object_uri("x.pdf").unwrap();
        let slashed = store.object_uri("/x.pdf").unwrap();
        assert_ne!(plain, slashed);
        assert_eq!(slashed.path(), "/bucket//x.pdf");
    }

    #[tokio::test]
    async fn test_get_found() {
        let store = HttpStore::new(&spawn_origin().await).unwrap();
        let object = store.get("report.pdf").await.unwrap().unwrap();
        assert_eq!(object.size(), Some(11));
        let body = object.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"%PDF report");
    }

    #[tokio::test]
    async fn test_get_nested_key_with_space() {
        let store = HttpStore::new(&spawn_origin().await).unwrap();
        let object = store.get("user 1/resume.pdf").await.unwrap().unwrap();
        let body = object.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"%PDF nested");
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let store = HttpStore::new(&spawn_origin().await).unwrap();
        assert!(store.get("missing.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_upstream_failure() {
        let store = HttpStore::new(&spawn_origin().await).unwrap();
        let err = store.get("broken.pdf").await.err().unwrap();
        assert!(matches!(
            err,
            StoreError::Upstream { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }
}
