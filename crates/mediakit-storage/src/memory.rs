//! In-process storage backend
//!
//! Blobs live in a shared map for the lifetime of the value. Used by the CLI
//! for dry runs and by tests for assertions on what was stored.

use crate::traits::{check_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
    base_url: String,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url("memory://")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Keys of all stored blobs, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn generate_url(&self, key: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn store(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        check_key(storage_key)?;
        tracing::debug!(key = %storage_key, size_bytes = data.len(), "Memory storage store");
        self.files.write().await.insert(storage_key.to_string(), data);
        Ok(self.generate_url(storage_key))
    }

    async fn read(&self, storage_key: &str) -> StorageResult<Bytes> {
        check_key(storage_key)?;
        self.files
            .read()
            .await
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        check_key(storage_key)?;
        self.files.write().await.remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        check_key(storage_key)?;
        Ok(self.files.read().await.contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_roundtrip_and_delete() {
        let storage = MemoryStorage::new();
        let url = storage
            .store("a/b.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "memory://a/b.png");
        assert_eq!(storage.read("a/b.png").await.unwrap(), Bytes::from_static(b"png"));
        assert_eq!(storage.len().await, 1);

        storage.delete("a/b.png").await.unwrap();
        assert!(storage.is_empty().await);
        assert!(matches!(
            storage.read("a/b.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let storage = MemoryStorage::with_base_url("https://cdn.example.com");
        let clone = storage.clone();
        let url = clone
            .store("x/y.mp4", Bytes::from_static(b"mp4"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/x/y.mp4");
        assert_eq!(storage.keys().await, vec!["x/y.mp4".to_string()]);
    }
}
