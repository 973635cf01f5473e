// Local bucket backend
// Objects are regular files below a root directory, keyed by relative path

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;

use super::{ObjectStore, StoreError, StoredObject};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        let path = resolve_key(&self.root, key)?;
        open_object(&path).await
    }

    fn describe(&self) -> String {
        format!("local bucket at {}", self.root.display())
    }
}

/// Map an object key onto a path below `root`
///
/// Only plain path segments are accepted; `..`, absolute paths and empty keys
/// are rejected so a key can never address anything outside `root`.
pub fn resolve_key(root: &Path, key: &str) -> Result<PathBuf, StoreError> {
    let mut path = root.to_path_buf();
    let mut segments = 0usize;

    for component in Path::new(key).components() {
        match component {
            Component::Normal(segment) => {
                path.push(segment);
                segments += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidKey(key.to_string()));
            }
        }
    }

    if segments == 0 {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(path)
}

// NotFound / NotADirectory / directories → miss
pub async fn open_object(path: &Path) -> Result<Option<StoredObject>, StoreError> {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Ok(None);
    }
    Ok(Some(StoredObject::from_file(file, metadata.len())))
}
