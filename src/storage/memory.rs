use super::ObjectStore;
use crate::error::StorageError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// A call made against a [`MemoryObjectStore`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Download { bucket: String, key: String },
    Upload { bucket: String, key: String },
}

/// In-memory store for tests. Records every call it receives.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<(String, String), Vec<u8>>>,
    calls: Mutex<Vec<StoreCall>>,
}

fn poisoned(bucket: &str, key: &str) -> StorageError {
    StorageError::Io {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source: std::io::Error::other("lock poisoned"),
    }
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert((bucket.to_string(), key.to_string()), data.into());
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let objects = self.objects.read().ok()?;
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// All `(bucket, key)` pairs currently stored, sorted.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: StoreCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError> {
        self.record(StoreCall::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        let data = {
            let objects = self.objects.read().map_err(|_| poisoned(bucket, key))?;
            objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })?
        };
        std::fs::write(local_path, data).map_err(|source| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
    }

    fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.record(StoreCall::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        let data = std::fs::read(local_path).map_err(|source| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })?;
        let mut objects = self.objects.write().map_err(|_| poisoned(bucket, key))?;
        objects.insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }
}
