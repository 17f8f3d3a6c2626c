#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{MemoryStorage, Storage, StorageBackend, StorageError, StorageResult};
use mediakit_core::ProcessingConfig;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "/system";

/// Create a storage backend based on configuration
pub async fn create_storage(config: &ProcessingConfig) -> StorageResult<Arc<dyn Storage>> {
    let base_url = config
        .local_storage_base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::with_base_url(base_url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backend_requires_path() {
        let config = ProcessingConfig::default();
        let result = create_storage(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let config = ProcessingConfig {
            storage_backend: StorageBackend::Memory,
            ..ProcessingConfig::default()
        };
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn test_local_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessingConfig {
            local_storage_path: Some(dir.path().to_string_lossy().into_owned()),
            ..ProcessingConfig::default()
        };
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
