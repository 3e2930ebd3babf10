use super::{ObjectStore, validate_key};
use crate::error::StorageError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem-backed store: `<root>/<bucket>/<key>`.
///
/// Uploads are written to a temporary file next to the destination and
/// renamed into place, so readers never observe a half-written object.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(StorageError::InvalidKey {
                key: bucket.to_string(),
                reason: "invalid bucket name",
            });
        }
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

fn map_io(err: std::io::Error, bucket: &str, key: &str) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        ErrorKind::PermissionDenied => StorageError::PermissionDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: err,
        },
    }
}

impl ObjectStore for LocalObjectStore {
    fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let src = self.object_path(bucket, key)?;
        if !src.is_file() {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        debug!("copy {} -> {}", src.display(), local_path.display());
        std::fs::copy(&src, local_path).map_err(|e| map_io(e, bucket, key))?;
        Ok(())
    }

    fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        let dst = self.object_path(bucket, key)?;
        let parent = dst.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(parent).map_err(|e| map_io(e, bucket, key))?;

        let mut src = std::fs::File::open(local_path).map_err(|e| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: e,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| map_io(e, bucket, key))?;
        std::io::copy(&mut src, tmp.as_file_mut()).map_err(|e| map_io(e, bucket, key))?;
        tmp.persist(&dst).map_err(|e| map_io(e.error, bucket, key))?;
        debug!("stored {} -> {}", local_path.display(), dst.display());
        Ok(())
    }
}
