use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use catalog_core::product::{CreateProduct, Product};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        group_id: row.get("group_id")?,
        external_reference_code: row.get("external_reference_code")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_product_sync(&self, input: &CreateProduct) -> Result<Product, DbError> {
        self.with_conn(|conn| {
            let code = input
                .external_reference_code
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            conn.execute(
                "INSERT INTO products (tenant_id, group_id, external_reference_code, name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![input.tenant_id, input.group_id, code, input.name, Utc::now()],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DbError::Conflict(format!("product with reference code '{code}'"))
                }
                other => DbError::Internal(other.to_string()),
            })?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT * FROM products WHERE id = ?1",
                params![id],
                row_to_product,
            )
            .to_db()
        })
    }

    pub fn get_product_sync(&self, id: i64) -> Result<Product, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM products WHERE id = ?1",
                params![id],
                row_to_product,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("product {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn fetch_product_by_reference_code_sync(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<Product>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM products WHERE tenant_id = ?1 AND external_reference_code = ?2",
                params![tenant_id, code],
                row_to_product,
            )
            .optional()
            .to_db()
        })
    }
}
