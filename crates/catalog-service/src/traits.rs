use std::collections::HashMap;

use async_trait::async_trait;
use catalog_core::attachment::{AttachmentDto, AttachmentRecord};
use catalog_core::locale::LocalizedMap;
use catalog_core::{CatalogError, Product, Tenant};
use catalog_db::DbError;
use catalog_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Db(DbError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Db(other),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::InvalidKey(key) => ServiceError::InvalidInput(format!("file name {key}")),
            other => ServiceError::Store(other),
        }
    }
}

impl From<CatalogError> for ServiceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

/// Resolves the product that owns a set of attachments.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// `id` is a primary key or an external reference code.
    async fn resolve(&self, id: &str, tenant: &Tenant) -> Result<Product, ServiceError>;
}

/// Turns stored records into their wire form.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn to_wire(&self, record: &AttachmentRecord) -> Result<AttachmentDto, ServiceError>;
}

pub trait LocalizationHelper: Send + Sync {
    fn to_locale_map(&self, map: &HashMap<String, String>) -> Result<LocalizedMap, ServiceError>;
}
