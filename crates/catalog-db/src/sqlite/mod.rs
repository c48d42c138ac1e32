pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use catalog_core::attachment::{
    AttachmentFields, AttachmentFilter, AttachmentRecord, UpsertAttachment, WorkflowStatus,
};
use catalog_core::product::{CreateProduct, Product};

use crate::{AttachmentStore, DbConfig, DbError, ProductStore};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("catalog.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            migrations::run(conn)?;
            Ok(())
        })
    }

    /// Run a synchronous query on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[async_trait]
impl ProductStore for SqliteDatabase {
    async fn create_product(&self, input: &CreateProduct) -> Result<Product, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.create_product_sync(&input)).await
    }

    async fn get_product(&self, id: i64) -> Result<Product, DbError> {
        self.blocking(move |db| db.get_product_sync(id)).await
    }

    async fn fetch_product_by_reference_code(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<Product>, DbError> {
        let code = code.to_string();
        self.blocking(move |db| db.fetch_product_by_reference_code_sync(tenant_id, &code))
            .await
    }
}

#[async_trait]
impl AttachmentStore for SqliteDatabase {
    async fn get_attachment(&self, id: i64) -> Result<AttachmentRecord, DbError> {
        self.blocking(move |db| db.get_attachment_sync(id)).await
    }

    async fn fetch_attachment_by_reference_code(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<AttachmentRecord>, DbError> {
        let code = code.to_string();
        self.blocking(move |db| db.fetch_attachment_by_reference_code_sync(tenant_id, &code))
            .await
    }

    async fn upsert_attachment(&self, input: &UpsertAttachment) -> Result<AttachmentRecord, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.upsert_attachment_sync(&input)).await
    }

    async fn update_attachment(
        &self,
        id: i64,
        fields: &AttachmentFields,
    ) -> Result<AttachmentRecord, DbError> {
        let fields = fields.clone();
        self.blocking(move |db| db.update_attachment_sync(id, &fields)).await
    }

    async fn set_attachment_status(
        &self,
        id: i64,
        status: WorkflowStatus,
    ) -> Result<AttachmentRecord, DbError> {
        self.blocking(move |db| db.set_attachment_status_sync(id, status)).await
    }

    async fn delete_attachment(&self, id: i64) -> Result<(), DbError> {
        self.blocking(move |db| db.delete_attachment_sync(id)).await
    }

    async fn list_attachments(
        &self,
        filter: &AttachmentFilter,
        start: i64,
        end: i64,
    ) -> Result<Vec<AttachmentRecord>, DbError> {
        let filter = filter.clone();
        self.blocking(move |db| db.list_attachments_sync(&filter, start, end))
            .await
    }

    async fn count_attachments(&self, filter: &AttachmentFilter) -> Result<i64, DbError> {
        let filter = filter.clone();
        self.blocking(move |db| db.count_attachments_sync(&filter)).await
    }
}
