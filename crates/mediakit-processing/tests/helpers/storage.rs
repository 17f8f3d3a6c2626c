use async_trait::async_trait;
use bytes::Bytes;
use mediakit_core::StorageBackend;
use mediakit_storage::{MemoryStorage, Storage, StorageError, StorageResult};

/// Memory storage that refuses to store keys containing `fail_on`.
pub struct FailingStorage {
    pub inner: MemoryStorage,
    fail_on: &'static str,
}

impl FailingStorage {
    pub fn new(fail_on: &'static str) -> Self {
        Self {
            inner: MemoryStorage::new(),
            fail_on,
        }
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn store(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<String> {
        if storage_key.contains(self.fail_on) {
            return Err(StorageError::StoreFailed(format!("refusing {}", storage_key)));
        }
        self.inner.store(storage_key, data, content_type).await
    }

    async fn read(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.inner.read(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
