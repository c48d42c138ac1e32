mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::attachment::{
    AttachmentFields, AttachmentFilter, AttachmentRecord, UpsertAttachment, WorkflowStatus,
};
use catalog_core::product::{CreateProduct, Product};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

/// Where the SQLite file lives.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Defaults to `<data_dir>/catalog.db` when unset.
    pub sqlite_path: Option<String>,
}

/// `$XDG_DATA_HOME/catalog`, falling back to `~/.local/share/catalog`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("catalog")
}

/// Lookup side of the owning entities. Products are created elsewhere in
/// the platform; `create_product` exists for seeding.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(&self, input: &CreateProduct) -> Result<Product, DbError>;
    async fn get_product(&self, id: i64) -> Result<Product, DbError>;
    async fn fetch_product_by_reference_code(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<Product>, DbError>;
}

/// Persistence for attachment records. Each method is atomic on its own.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn get_attachment(&self, id: i64) -> Result<AttachmentRecord, DbError>;
    async fn fetch_attachment_by_reference_code(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<AttachmentRecord>, DbError>;
    async fn upsert_attachment(&self, input: &UpsertAttachment) -> Result<AttachmentRecord, DbError>;
    async fn update_attachment(
        &self,
        id: i64,
        fields: &AttachmentFields,
    ) -> Result<AttachmentRecord, DbError>;
    async fn set_attachment_status(
        &self,
        id: i64,
        status: WorkflowStatus,
    ) -> Result<AttachmentRecord, DbError>;
    async fn delete_attachment(&self, id: i64) -> Result<(), DbError>;
    /// Records matching `filter`, ordered by priority, in `[start, end)`.
    async fn list_attachments(
        &self,
        filter: &AttachmentFilter,
        start: i64,
        end: i64,
    ) -> Result<Vec<AttachmentRecord>, DbError>;
    async fn count_attachments(&self, filter: &AttachmentFilter) -> Result<i64, DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_catalog() {
        assert!(data_dir().ends_with("catalog"));
    }

    #[test]
    fn db_error_messages() {
        assert_eq!(
            DbError::NotFound("attachment 4".into()).to_string(),
            "not found: attachment 4"
        );
        assert_eq!(
            DbError::Conflict("code taken".into()).to_string(),
            "conflict: code taken"
        );
    }
}
