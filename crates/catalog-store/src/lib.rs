mod content_type;
mod files;
mod local;

pub use content_type::{default_file_name, detect_content_type, OCTET_STREAM};
pub use files::{
    append_parenthetical_suffix, unique_file_name, FileHandle, FileStore, ObjectFileStore,
    TempScope, UNIQUE_FILE_NAME_TRIES,
};
pub use local::LocalStore;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A store for opaque blobs keyed by `/`-separated string paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (create or overwrite) an object.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read an object. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self.get(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// -- Key helpers --

/// Folder that holds temp uploads made through the attachment helper.
pub const TEMP_FOLDER: &str = "attachments";

pub fn temp_file_key(scope: &TempScope, file_name: &str) -> String {
    format!(
        "temp/{}/{}/{TEMP_FOLDER}/{file_name}",
        scope.group_id, scope.user_id
    )
}

pub fn file_meta_key(file_key: &str) -> String {
    format!("meta/{file_key}.json")
}

// -- Configuration --

/// Configuration for the object store backend.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Local filesystem base directory. Defaults to the catalog data dir.
    pub local_data_dir: Option<String>,
}

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Arc<dyn ObjectStore> {
    Arc::new(LocalStore::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_helpers_produce_expected_paths() {
        let scope = TempScope {
            group_id: 20,
            user_id: 7,
        };
        assert_eq!(
            temp_file_key(&scope, "front (1).png"),
            "temp/20/7/attachments/front (1).png"
        );
        assert_eq!(
            file_meta_key("temp/20/7/attachments/front.png"),
            "meta/temp/20/7/attachments/front.png.json"
        );
    }

    #[tokio::test]
    async fn create_store_uses_configured_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            local_data_dir: Some(tmp.path().to_string_lossy().to_string()),
        };
        let store = create_store(&config);
        store.put("a/b.txt", Bytes::from("x")).await.unwrap();
        assert!(tmp.path().join("a/b.txt").exists());
    }
}
