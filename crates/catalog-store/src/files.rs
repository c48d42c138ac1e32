use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{file_meta_key, temp_file_key, ObjectStore, StoreError};

/// Upper bound on `name (N).ext` candidates tried before giving up.
pub const UNIQUE_FILE_NAME_TRIES: usize = 50;

/// Metadata of a stored file. `id` is the object key of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Temp uploads are namespaced per site group and uploading user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempScope {
    pub group_id: i64,
    pub user_id: i64,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store_temp(
        &self,
        scope: &TempScope,
        file_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<FileHandle, StoreError>;

    async fn temp_exists(&self, scope: &TempScope, file_name: &str) -> Result<bool, StoreError>;

    /// Look a file up by its handle id.
    async fn resolve(&self, id: &str) -> Result<FileHandle, StoreError>;
}

/// `FileStore` on top of any `ObjectStore`; metadata sits in a JSON sidecar.
pub struct ObjectFileStore {
    objects: Arc<dyn ObjectStore>,
}

impl ObjectFileStore {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }
}

#[async_trait]
impl FileStore for ObjectFileStore {
    async fn store_temp(
        &self,
        scope: &TempScope,
        file_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<FileHandle, StoreError> {
        let key = temp_file_key(scope, file_name);
        let handle = FileHandle {
            id: key.clone(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes: data.len() as u64,
            created_at: Utc::now(),
        };
        let meta = serde_json::to_vec(&handle)
            .map_err(|e| StoreError::Internal(format!("encode metadata: {e}")))?;

        self.objects.put(&key, data).await?;
        self.objects.put(&file_meta_key(&key), Bytes::from(meta)).await?;
        debug!(key = %key, size = handle.size_bytes, "stored temp file");
        Ok(handle)
    }

    async fn temp_exists(&self, scope: &TempScope, file_name: &str) -> Result<bool, StoreError> {
        self.objects.exists(&temp_file_key(scope, file_name)).await
    }

    async fn resolve(&self, id: &str) -> Result<FileHandle, StoreError> {
        let raw = self.objects.get(&file_meta_key(id)).await?;
        serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Internal(format!("decode metadata for {id}: {e}")))
    }
}

/// Insert ` (n)` before the extension: `front.png` becomes `front (2).png`.
pub fn append_parenthetical_suffix(file_name: &str, n: usize) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({n}){}", &file_name[..dot], &file_name[dot..]),
        _ => format!("{file_name} ({n})"),
    }
}

/// Find a name not yet taken according to `taken`.
///
/// Tries `file_name` first, then `file_name (1)`, `file_name (2)` and so on,
/// failing once [`UNIQUE_FILE_NAME_TRIES`] candidates were all taken.
pub async fn unique_file_name<F, Fut>(file_name: &str, mut taken: F) -> Result<String, StoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut candidate = file_name.to_string();
    for n in 1..=UNIQUE_FILE_NAME_TRIES {
        if !taken(candidate.clone()).await {
            return Ok(candidate);
        }
        candidate = append_parenthetical_suffix(file_name, n);
    }
    Err(StoreError::Internal(format!(
        "unable to find a unique file name for {file_name}"
    )))
}
