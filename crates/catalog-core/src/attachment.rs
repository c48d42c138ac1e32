use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::LocalizedMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Other,
    Image,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Other => "other",
            AttachmentKind::Image => "image",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AttachmentKind::Other => "Attachment",
            AttachmentKind::Image => "Image",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "other" => Some(AttachmentKind::Other),
            "image" => Some(AttachmentKind::Image),
            _ => None,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Workflow state of a record. Only `Approved` records are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Approved,
    Draft,
    Pending,
    Scheduled,
    Expired,
    Inactive,
}

impl WorkflowStatus {
    pub const ALL: &[WorkflowStatus] = &[
        WorkflowStatus::Approved,
        WorkflowStatus::Draft,
        WorkflowStatus::Pending,
        WorkflowStatus::Scheduled,
        WorkflowStatus::Expired,
        WorkflowStatus::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Scheduled => "scheduled",
            WorkflowStatus::Expired => "expired",
            WorkflowStatus::Inactive => "inactive",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(WorkflowStatus::Approved),
            "draft" => Some(WorkflowStatus::Draft),
            "pending" => Some(WorkflowStatus::Pending),
            "scheduled" => Some(WorkflowStatus::Scheduled),
            "expired" => Some(WorkflowStatus::Expired),
            "inactive" => Some(WorkflowStatus::Inactive),
            _ => None,
        }
    }
}

/// A file association hanging off an owning entity (a product, today).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub id: i64,
    pub tenant_id: i64,
    pub group_id: i64,
    pub external_reference_code: String,
    pub owner_type: String,
    pub owner_id: i64,
    pub kind: AttachmentKind,
    pub file_id: Option<String>,
    pub display_date: DateTime<Utc>,
    /// `None` means the attachment never expires.
    pub expiration_date: Option<DateTime<Utc>>,
    pub title: LocalizedMap,
    pub options: String,
    pub priority: f64,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttachmentRecord {
    pub fn never_expire(&self) -> bool {
        self.expiration_date.is_none()
    }
}

/// The mutable field set written by both update and upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentFields {
    pub kind: AttachmentKind,
    pub file_id: Option<String>,
    pub display_date: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub title: LocalizedMap,
    pub options: String,
    pub priority: f64,
}

/// Upsert key plus fields. The store matches on
/// (tenant, owner, kind, reference code) and inserts when nothing matches.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertAttachment {
    pub tenant_id: i64,
    pub group_id: i64,
    pub owner_type: String,
    pub owner_id: i64,
    pub external_reference_code: Option<String>,
    pub fields: AttachmentFields,
}

/// Filter shared by the paged listing and its count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFilter {
    pub owner_type: String,
    pub owner_id: i64,
    pub kind: AttachmentKind,
    pub status: WorkflowStatus,
}

/// Wire representation of an attachment, used for both input and output.
///
/// On input every field is optional. `attachment` carries inline base64
/// content and `src` a `file:` URI to read the content from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub never_expire: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AttachmentKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_kind_parse_str() {
        assert_eq!(AttachmentKind::parse_str("other"), Some(AttachmentKind::Other));
        assert_eq!(AttachmentKind::parse_str("image"), Some(AttachmentKind::Image));
        assert_eq!(AttachmentKind::parse_str("IMAGE"), None);
        assert_eq!(AttachmentKind::parse_str(""), None);
    }

    #[test]
    fn attachment_kind_display() {
        assert_eq!(format!("{}", AttachmentKind::Other), "Attachment");
        assert_eq!(format!("{}", AttachmentKind::Image), "Image");
    }

    #[test]
    fn workflow_status_as_str_roundtrip() {
        for s in WorkflowStatus::ALL {
            assert_eq!(WorkflowStatus::parse_str(s.as_str()), Some(*s));
        }
        assert_eq!(WorkflowStatus::parse_str("approved "), None);
    }

    #[test]
    fn dto_reads_camel_case_and_type() {
        let dto: AttachmentDto = serde_json::from_str(
            r#"{
                "externalReferenceCode": "FRONT-1",
                "neverExpire": true,
                "title": {"en_US": "Front view"},
                "priority": 2.5,
                "type": "image"
            }"#,
        )
        .unwrap();
        assert_eq!(dto.external_reference_code.as_deref(), Some("FRONT-1"));
        assert_eq!(dto.never_expire, Some(true));
        assert_eq!(dto.priority, Some(2.5));
        assert_eq!(dto.kind, Some(AttachmentKind::Image));
        assert!(dto.display_date.is_none());
        assert!(dto.attachment.is_none());
    }

    #[test]
    fn dto_omits_absent_fields_on_output() {
        let dto = AttachmentDto {
            id: Some(7),
            kind: Some(AttachmentKind::Other),
            ..Default::default()
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "type": "other"}));
    }

    #[test]
    fn never_expire_follows_expiration_date() {
        let now = Utc::now();
        let mut record = AttachmentRecord {
            id: 1,
            tenant_id: 1,
            group_id: 1,
            external_reference_code: "A".into(),
            owner_type: "product".into(),
            owner_id: 1,
            kind: AttachmentKind::Other,
            file_id: None,
            display_date: now,
            expiration_date: None,
            title: LocalizedMap::new(),
            options: String::new(),
            priority: 0.0,
            status: WorkflowStatus::Approved,
            created_at: now,
            updated_at: now,
        };
        assert!(record.never_expire());
        record.expiration_date = Some(now);
        assert!(!record.never_expire());
    }
}
