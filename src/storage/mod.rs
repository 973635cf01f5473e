//! Object storage module
//!
//! The request handler only ever calls [`ObjectStore::get`]. Backends:
//! - `local`: a directory tree acting as the bucket
//! - `http`: a public bucket origin reached over plain HTTP
//! - `cache`: read-through disk cache in front of either of them

mod cache;
mod local;
#[cfg(test)]
pub mod memory;
mod remote;

pub use cache::CachedStore;
pub use local::LocalStore;
pub use remote::HttpStore;

use crate::config::{BackendKind, StorageConfig};
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Body, Bytes, Frame};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Streaming body of a stored object
pub type ObjectBody = UnsyncBoxBody<Bytes, io::Error>;

/// Errors raised by a store lookup, as opposed to a plain miss
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid object key '{0}'")]
    InvalidKey(String),
    #[error("invalid storage endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("upstream answered {status} for '{key}'")]
    Upstream {
        key: String,
        status: hyper::StatusCode,
    },
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}

/// An object found in the bucket: its byte stream and, if known, its length
pub struct StoredObject {
    body: ObjectBody,
    size: Option<u64>,
}

impl StoredObject {
    pub fn new<B>(body: B, size: Option<u64>) -> Self
    where
        B: Body<Data = Bytes, Error = io::Error> + Send + 'static,
    {
        Self {
            body: body.boxed_unsync(),
            size,
        }
    }

    /// Stream an opened file without reading it into memory
    pub fn from_file(file: File, len: u64) -> Self {
        let stream = ReaderStream::new(file).map_ok(Frame::data);
        Self::new(StreamBody::new(stream), Some(len))
    }

    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn into_body(self) -> ObjectBody {
        self.body
    }
}

/// Get-by-key access to a bucket
pub trait ObjectStore {
    /// Look up `key`. `Ok(None)` means the bucket has no such object.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError>;

    /// Short description of the backing store, logged at startup
    fn describe(&self) -> String;
}

/// A directly reachable bucket
pub enum Backend {
    Local(LocalStore),
    Http(HttpStore),
}

impl ObjectStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        match self {
            Self::Local(store) => store.get(key).await,
            Self::Http(store) => store.get(key).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Local(store) => store.describe(),
            Self::Http(store) => store.describe(),
        }
    }
}

/// The store selected by `[storage]` configuration
pub enum ConfiguredStore {
    Direct(Backend),
    Cached(CachedStore<Backend>),
}

impl ObjectStore for ConfiguredStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        match self {
            Self::Direct(store) => store.get(key).await,
            Self::Cached(store) => store.get(key).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Direct(store) => store.describe(),
            Self::Cached(store) => store.describe(),
        }
    }
}

/// Build the store described by configuration
pub fn open(config: &StorageConfig) -> Result<ConfiguredStore, StoreError> {
    let backend = match config.backend {
        BackendKind::Local => Backend::Local(LocalStore::new(&config.root)),
        BackendKind::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| StoreError::InvalidEndpoint(String::new()))?;
            Backend::Http(HttpStore::new(endpoint)?)
        }
    };

    Ok(match &config.cache_dir {
        Some(dir) => ConfiguredStore::Cached(CachedStore::new(backend, dir)),
        None => ConfiguredStore::Direct(backend),
    })
}
