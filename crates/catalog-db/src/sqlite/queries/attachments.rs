use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use catalog_core::attachment::{
    AttachmentFields, AttachmentFilter, AttachmentKind, AttachmentRecord, UpsertAttachment,
    WorkflowStatus,
};
use catalog_core::locale::LocalizedMap;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn conversion_error(row: &Row, column: &str, msg: String) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn row_to_attachment(row: &Row) -> rusqlite::Result<AttachmentRecord> {
    let kind_str: String = row.get("kind")?;
    let kind = AttachmentKind::parse_str(&kind_str)
        .ok_or_else(|| conversion_error(row, "kind", format!("unknown kind '{kind_str}'")))?;
    let status_str: String = row.get("status")?;
    let status = WorkflowStatus::parse_str(&status_str)
        .ok_or_else(|| conversion_error(row, "status", format!("unknown status '{status_str}'")))?;
    let title_json: String = row.get("title")?;
    let title: LocalizedMap = serde_json::from_str(&title_json)
        .map_err(|e| conversion_error(row, "title", e.to_string()))?;

    Ok(AttachmentRecord {
        id: row.get("id")?,
        tenant_id: row.get("tenant_id")?,
        group_id: row.get("group_id")?,
        external_reference_code: row.get("external_reference_code")?,
        owner_type: row.get("owner_type")?,
        owner_id: row.get("owner_id")?,
        kind,
        file_id: row.get("file_id")?,
        display_date: row.get("display_date")?,
        expiration_date: row.get("expiration_date")?,
        title,
        options: row.get("options")?,
        priority: row.get("priority")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn title_json(title: &LocalizedMap) -> Result<String, DbError> {
    serde_json::to_string(title).map_err(|e| DbError::Internal(format!("encode title: {e}")))
}

fn select_by_id(conn: &Connection, id: i64) -> Result<AttachmentRecord, DbError> {
    conn.query_row(
        "SELECT * FROM attachments WHERE id = ?1",
        params![id],
        row_to_attachment,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("attachment {id}")),
        other => DbError::Internal(other.to_string()),
    })
}

/// Overwrite the mutable columns of one row. Returns false if the row is gone.
fn write_fields(conn: &Connection, id: i64, fields: &AttachmentFields) -> Result<bool, DbError> {
    let changed = conn
        .execute(
            "UPDATE attachments
             SET kind = ?1, file_id = ?2, display_date = ?3, expiration_date = ?4,
                 title = ?5, options = ?6, priority = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                fields.kind.as_str(),
                fields.file_id,
                fields.display_date,
                fields.expiration_date,
                title_json(&fields.title)?,
                fields.options,
                fields.priority,
                Utc::now(),
                id,
            ],
        )
        .to_db()?;
    Ok(changed > 0)
}

impl SqliteDatabase {
    pub fn get_attachment_sync(&self, id: i64) -> Result<AttachmentRecord, DbError> {
        self.with_conn(|conn| select_by_id(conn, id))
    }

    pub fn fetch_attachment_by_reference_code_sync(
        &self,
        tenant_id: i64,
        code: &str,
    ) -> Result<Option<AttachmentRecord>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM attachments WHERE tenant_id = ?1 AND external_reference_code = ?2",
                params![tenant_id, code],
                row_to_attachment,
            )
            .optional()
            .to_db()
        })
    }

    /// Update the record matching (tenant, reference code) when it belongs to
    /// the same owner and kind, otherwise insert a new one. A reference code
    /// already used by a different owner or kind is a conflict.
    pub fn upsert_attachment_sync(
        &self,
        input: &UpsertAttachment,
    ) -> Result<AttachmentRecord, DbError> {
        self.with_conn(|conn| {
            if let Some(code) = input.external_reference_code.as_deref() {
                let existing = conn
                    .query_row(
                        "SELECT * FROM attachments WHERE tenant_id = ?1 AND external_reference_code = ?2",
                        params![input.tenant_id, code],
                        row_to_attachment,
                    )
                    .optional()
                    .to_db()?;
                if let Some(existing) = existing {
                    if existing.owner_type != input.owner_type
                        || existing.owner_id != input.owner_id
                        || existing.kind != input.fields.kind
                    {
                        return Err(DbError::Conflict(format!(
                            "reference code '{code}' belongs to another {} attachment",
                            existing.kind.as_str()
                        )));
                    }
                    debug!(id = existing.id, code, "upsert matched existing attachment");
                    // Without new content the stored file stays attached.
                    let mut fields = input.fields.clone();
                    if fields.file_id.is_none() {
                        fields.file_id = existing.file_id;
                    }
                    write_fields(conn, existing.id, &fields)?;
                    return select_by_id(conn, existing.id);
                }
            }

            let code = input
                .external_reference_code
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let now = Utc::now();
            conn.execute(
                "INSERT INTO attachments (
                    tenant_id, group_id, external_reference_code, owner_type, owner_id, kind,
                    file_id, display_date, expiration_date, title, options, priority, status,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    input.tenant_id,
                    input.group_id,
                    code,
                    input.owner_type,
                    input.owner_id,
                    input.fields.kind.as_str(),
                    input.fields.file_id,
                    input.fields.display_date,
                    input.fields.expiration_date,
                    title_json(&input.fields.title)?,
                    input.fields.options,
                    input.fields.priority,
                    WorkflowStatus::Approved.as_str(),
                    now,
                    now,
                ],
            )
            .to_db()?;
            let id = conn.last_insert_rowid();
            debug!(id, code = %code, "inserted attachment");
            select_by_id(conn, id)
        })
    }

    pub fn update_attachment_sync(
        &self,
        id: i64,
        fields: &AttachmentFields,
    ) -> Result<AttachmentRecord, DbError> {
        self.with_conn(|conn| {
            if !write_fields(conn, id, fields)? {
                return Err(DbError::NotFound(format!("attachment {id}")));
            }
            select_by_id(conn, id)
        })
    }

    pub fn set_attachment_status_sync(
        &self,
        id: i64,
        status: WorkflowStatus,
    ) -> Result<AttachmentRecord, DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE attachments SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![status.as_str(), Utc::now(), id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("attachment {id}")));
            }
            select_by_id(conn, id)
        })
    }

    pub fn delete_attachment_sync(&self, id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM attachments WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("attachment {id}")));
            }
            Ok(())
        })
    }

    /// Page of records in `[start, end)`. Bounds go to SQLite as-is: a
    /// negative offset reads from the start and a negative limit is unbounded.
    pub fn list_attachments_sync(
        &self,
        filter: &AttachmentFilter,
        start: i64,
        end: i64,
    ) -> Result<Vec<AttachmentRecord>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM attachments
                     WHERE owner_type = ?1 AND owner_id = ?2 AND kind = ?3 AND status = ?4
                     ORDER BY priority ASC, id ASC
                     LIMIT ?5 OFFSET ?6",
                )
                .to_db()?;
            let attachments = stmt
                .query_map(
                    params![
                        filter.owner_type,
                        filter.owner_id,
                        filter.kind.as_str(),
                        filter.status.as_str(),
                        end.saturating_sub(start),
                        start,
                    ],
                    row_to_attachment,
                )
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(attachments)
        })
    }

    pub fn count_attachments_sync(&self, filter: &AttachmentFilter) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT count(*) FROM attachments
                 WHERE owner_type = ?1 AND owner_id = ?2 AND kind = ?3 AND status = ?4",
                params![
                    filter.owner_type,
                    filter.owner_id,
                    filter.kind.as_str(),
                    filter.status.as_str(),
                ],
                |row| row.get(0),
            )
            .to_db()
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, day, 12, 0, 0).unwrap()
    }

    fn fields(kind: AttachmentKind, priority: f64) -> AttachmentFields {
        AttachmentFields {
            kind,
            file_id: Some("temp/20/7/manual.pdf".into()),
            display_date: at(1),
            expiration_date: Some(at(30)),
            title: LocalizedMap::from([("en_US".to_string(), "Manual".to_string())]),
            options: "{}".into(),
            priority,
        }
    }

    fn upsert(code: Option<&str>, owner_id: i64, fields: AttachmentFields) -> UpsertAttachment {
        UpsertAttachment {
            tenant_id: 1,
            group_id: 20,
            owner_type: "product".into(),
            owner_id,
            external_reference_code: code.map(String::from),
            fields,
        }
    }

    fn filter(owner_id: i64, kind: AttachmentKind) -> AttachmentFilter {
        AttachmentFilter {
            owner_type: "product".into(),
            owner_id,
            kind,
            status: WorkflowStatus::Approved,
        }
    }

    #[test]
    fn upsert_inserts_and_roundtrips_every_column() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let record = db
            .upsert_attachment_sync(&upsert(Some("MANUAL"), 5, fields(AttachmentKind::Other, 1.5)))
            .unwrap();
        assert_eq!(record.external_reference_code, "MANUAL");
        assert_eq!(record.owner_id, 5);
        assert_eq!(record.kind, AttachmentKind::Other);
        assert_eq!(record.file_id.as_deref(), Some("temp/20/7/manual.pdf"));
        assert_eq!(record.display_date, at(1));
        assert_eq!(record.expiration_date, Some(at(30)));
        assert_eq!(record.title["en_US"], "Manual");
        assert_eq!(record.options, "{}");
        assert_eq!(record.priority, 1.5);
        assert_eq!(record.status, WorkflowStatus::Approved);

        assert_eq!(db.get_attachment_sync(record.id).unwrap(), record);
    }

    #[test]
    fn upsert_with_same_code_updates_in_place() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let first = db
            .upsert_attachment_sync(&upsert(Some("MANUAL"), 5, fields(AttachmentKind::Other, 1.0)))
            .unwrap();
        let mut changed = fields(AttachmentKind::Other, 9.0);
        changed.expiration_date = None;
        let second = db
            .upsert_attachment_sync(&upsert(Some("MANUAL"), 5, changed))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.priority, 9.0);
        assert!(second.never_expire());
        assert_eq!(db.count_attachments_sync(&filter(5, AttachmentKind::Other)).unwrap(), 1);
    }

    #[test]
    fn upsert_without_code_always_inserts() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let a = db
            .upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Image, 0.0)))
            .unwrap();
        let b = db
            .upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Image, 0.0)))
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.external_reference_code, b.external_reference_code);
        assert!(uuid::Uuid::parse_str(&a.external_reference_code).is_ok());
    }

    #[test]
    fn upsert_code_owned_by_other_owner_conflicts() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.upsert_attachment_sync(&upsert(Some("SHARED"), 5, fields(AttachmentKind::Other, 0.0)))
            .unwrap();
        let err = db
            .upsert_attachment_sync(&upsert(Some("SHARED"), 6, fields(AttachmentKind::Other, 0.0)))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let err = db
            .upsert_attachment_sync(&upsert(Some("SHARED"), 5, fields(AttachmentKind::Image, 0.0)))
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[test]
    fn update_replaces_fields_but_not_identity() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let record = db
            .upsert_attachment_sync(&upsert(Some("IMG"), 5, fields(AttachmentKind::Other, 1.0)))
            .unwrap();
        let mut next = fields(AttachmentKind::Image, 3.0);
        next.file_id = None;
        next.title = LocalizedMap::new();
        let updated = db.update_attachment_sync(record.id, &next).unwrap();
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.external_reference_code, "IMG");
        assert_eq!(updated.kind, AttachmentKind::Image);
        assert_eq!(updated.file_id, None);
        assert!(updated.title.is_empty());
        assert_eq!(updated.created_at, record.created_at);
    }

    #[test]
    fn update_missing_is_not_found() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let err = db
            .update_attachment_sync(404, &fields(AttachmentKind::Other, 0.0))
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn delete_removes_row_and_reports_missing() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let record = db
            .upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Other, 0.0)))
            .unwrap();
        db.delete_attachment_sync(record.id).unwrap();
        assert!(matches!(
            db.get_attachment_sync(record.id).unwrap_err(),
            DbError::NotFound(_)
        ));
        assert!(matches!(
            db.delete_attachment_sync(record.id).unwrap_err(),
            DbError::NotFound(_)
        ));
    }

    #[test]
    fn list_orders_by_priority_and_windows() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        for priority in [3.0, 1.0, 2.0] {
            db.upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Image, priority)))
                .unwrap();
        }
        let all = db
            .list_attachments_sync(&filter(5, AttachmentKind::Image), 0, 10)
            .unwrap();
        let priorities: Vec<f64> = all.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![1.0, 2.0, 3.0]);

        let page = db
            .list_attachments_sync(&filter(5, AttachmentKind::Image), 1, 2)
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].priority, 2.0);
    }

    #[test]
    fn list_and_count_exclude_unapproved_and_other_kinds() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let draft = db
            .upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Other, 0.0)))
            .unwrap();
        db.set_attachment_status_sync(draft.id, WorkflowStatus::Draft)
            .unwrap();
        db.upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Other, 0.0)))
            .unwrap();
        db.upsert_attachment_sync(&upsert(None, 5, fields(AttachmentKind::Image, 0.0)))
            .unwrap();
        db.upsert_attachment_sync(&upsert(None, 6, fields(AttachmentKind::Other, 0.0)))
            .unwrap();

        let f = filter(5, AttachmentKind::Other);
        assert_eq!(db.count_attachments_sync(&f).unwrap(), 1);
        assert_eq!(db.list_attachments_sync(&f, 0, 20).unwrap().len(), 1);
    }

    #[test]
    fn set_status_on_missing_is_not_found() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let err = db
            .set_attachment_status_sync(1, WorkflowStatus::Expired)
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }
}
