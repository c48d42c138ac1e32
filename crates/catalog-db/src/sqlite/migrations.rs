use chrono::Utc;
use rusqlite::{params, Connection};

use super::SqliteResultExt;
use crate::DbError;

pub(crate) const CURRENT_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .to_db()?;

    if current_version < CURRENT_VERSION {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS products (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id               INTEGER NOT NULL,
                group_id                INTEGER NOT NULL,
                external_reference_code TEXT NOT NULL,
                name                    TEXT NOT NULL,
                created_at              TEXT NOT NULL,
                UNIQUE(tenant_id, external_reference_code)
            );

            CREATE TABLE IF NOT EXISTS attachments (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id               INTEGER NOT NULL,
                group_id                INTEGER NOT NULL,
                external_reference_code TEXT NOT NULL,
                owner_type              TEXT NOT NULL,
                owner_id                INTEGER NOT NULL,
                kind                    TEXT NOT NULL CHECK(kind IN ('other', 'image')),
                file_id                 TEXT,
                display_date            TEXT NOT NULL,
                expiration_date         TEXT,
                title                   TEXT NOT NULL DEFAULT '{}',
                options                 TEXT NOT NULL DEFAULT '',
                priority                REAL NOT NULL DEFAULT 0,
                status                  TEXT NOT NULL DEFAULT 'approved',
                created_at              TEXT NOT NULL,
                updated_at              TEXT NOT NULL,
                UNIQUE(tenant_id, external_reference_code)
            );

            CREATE INDEX IF NOT EXISTS idx_attachments_owner
                ON attachments(owner_type, owner_id, kind, status);
            ",
        )
        .to_db()?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![CURRENT_VERSION, Utc::now()],
        )
        .to_db()?;
    }

    Ok(())
}
