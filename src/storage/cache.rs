// Read-through disk cache
// Serves objects from a local directory, filling it from the upstream store on a miss

use http_body_util::BodyExt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::local::{open_object, resolve_key};
use super::{ObjectBody, ObjectStore, StoreError, StoredObject};
use crate::logger;

/// Distinguishes temp files of concurrent fills for the same key
static FILL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Disk cache in front of another store
///
/// Misses are never cached. Keys with no safe cache path and any local
/// cache failure fall through to the upstream store.
pub struct CachedStore<S> {
    upstream: S,
    dir: PathBuf,
}

impl<S: ObjectStore> CachedStore<S> {
    pub fn new(upstream: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            upstream,
            dir: dir.into(),
        }
    }

    pub const fn upstream(&self) -> &S {
        &self.upstream
    }

    /// Copy `object` into the cache at `path` and reopen it from disk
    ///
    /// Only a failing upstream body is an error. Any local failure leaves no
    /// temp file behind and the object is fetched again and served directly.
    async fn fill(
        &self,
        key: &str,
        path: &Path,
        object: StoredObject,
    ) -> Result<Option<StoredObject>, StoreError> {
        let tmp = temp_path(path);
        let file = match create_temp(path, &tmp).await {
            Ok(f) => f,
            Err(e) => {
                logger::log_warning(&format!(
                    "[Cache] Cannot cache '{key}' at {}: {e}; serving upstream directly",
                    path.display()
                ));
                return Ok(Some(object));
            }
        };

        let stored = match write_body(file, object.into_body()).await {
            Ok(()) => fs::rename(&tmp, path).await,
            Err(FillError::Local(e)) => Err(e),
            Err(FillError::Upstream(e)) => {
                logger::log_error(&format!("[Cache] Upstream body for '{key}' failed: {e}"));
                let _ = fs::remove_file(&tmp).await;
                return Err(e.into());
            }
        };
        if let Err(e) = stored {
            let _ = fs::remove_file(&tmp).await;
            return self.refetch(key, e).await;
        }

        logger::log_debug(&format!("[Cache] Stored '{key}'"));
        match open_object(path).await {
            Ok(Some(cached)) => Ok(Some(cached)),
            Ok(None) => self.refetch(key, "cached object vanished").await,
            Err(e) => self.refetch(key, e).await,
        }
    }

    /// Serve `key` straight from upstream after the cache gave up on it
    async fn refetch(
        &self,
        key: &str,
        cause: impl std::fmt::Display,
    ) -> Result<Option<StoredObject>, StoreError> {
        logger::log_warning(&format!(
            "[Cache] Failed to cache '{key}': {cause}; serving upstream directly"
        ));
        self.upstream.get(key).await
    }
}

impl<S: ObjectStore> ObjectStore for CachedStore<S> {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        let Ok(path) = resolve_key(&self.dir, key) else {
            logger::log_debug(&format!("[Cache] '{key}' has no cache path, asking upstream"));
            return self.upstream.get(key).await;
        };

        match open_object(&path).await {
            Ok(Some(hit)) => {
                logger::log_debug(&format!("[Cache] Hit for '{key}'"));
                return Ok(Some(hit));
            }
            Ok(None) => {}
            Err(e) => logger::log_warning(&format!(
                "[Cache] Failed to read '{key}' from cache, falling back to upstream: {e}"
            )),
        }

        logger::log_debug(&format!("[Cache] Miss for '{key}', fetching upstream"));
        match self.upstream.get(key).await? {
            Some(object) => self.fill(key, &path, object).await,
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} (cached in {})",
            self.upstream().describe(),
            self.dir.display()
        )
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let seq = FILL_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.{seq}.tmp", std::process::id()));
    PathBuf::from(name)
}

async fn create_temp(path: &Path, tmp: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    File::create(tmp).await
}

/// Which side of a cache fill broke
enum FillError {
    Upstream(io::Error),
    Local(io::Error),
}

async fn write_body(mut file: File, mut body: ObjectBody) -> Result<(), FillError> {
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(FillError::Upstream)?;
        if let Ok(data) = frame.into_data() {
            file.write_all(&data).await.map_err(FillError::Local)?;
        }
    }
    file.flush().await.map_err(FillError::Local)
}
