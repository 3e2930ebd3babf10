//! Object store collaborator.
//!
//! The pipeline only ever reads the source object and writes the converted
//! one, so the contract is two calls that move whole files between a bucket
//! and the local filesystem. Errors are passed through to the caller as-is.

pub mod local;
pub mod memory;

use crate::error::StorageError;
use std::path::Path;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

pub trait ObjectStore {
    /// Copies `bucket/key` to `local_path`.
    fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Writes the file at `local_path` to `bucket/key`, replacing any object there.
    fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StorageError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError> {
        (**self).download(bucket, key, local_path)
    }

    fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        (**self).upload(local_path, bucket, key)
    }
}

/// Rejects keys that could escape a bucket when mapped onto a filesystem.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = |reason| StorageError::InvalidKey {
        key: key.to_string(),
        reason,
    };
    if key.is_empty() {
        return Err(invalid("empty key"));
    }
    if key.starts_with('/') {
        return Err(invalid("absolute key"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid("empty path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            _ => {}
        }
    }
    Ok(())
}
