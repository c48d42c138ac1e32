//! Field-level defaulting for attachment writes.
//!
//! Every field resolves as "incoming value, else existing value, else a
//! computed default". Keeping this pure lets the rules be tested without a
//! store or a clock.

use chrono::{DateTime, FixedOffset, Utc};

use crate::attachment::{AttachmentFields, AttachmentKind, AttachmentRecord};
use crate::dates::{add_months, DateConfig};
use crate::locale::LocalizedMap;
use crate::{CatalogError, Tenant};

/// Caller-supplied values for a write. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentPatch {
    pub kind: Option<AttachmentKind>,
    /// Handle of a file stored for this write, if any.
    pub file_id: Option<String>,
    pub display_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub never_expire: Option<bool>,
    pub title: Option<LocalizedMap>,
    pub options: Option<String>,
    pub priority: Option<f64>,
}

/// The clock and offsets used to fill in missing dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPolicy {
    /// "Now" in the tenant's timezone.
    pub now: DateTime<FixedOffset>,
    pub expiration_months: u32,
}

impl DefaultPolicy {
    pub const DEFAULT_EXPIRATION_MONTHS: u32 = 1;

    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self {
            now,
            expiration_months: Self::DEFAULT_EXPIRATION_MONTHS,
        }
    }

    pub fn for_tenant(tenant: &Tenant) -> Self {
        Self::at(tenant.now())
    }

    pub fn time_zone(&self) -> FixedOffset {
        *self.now.offset()
    }
}

/// Every field decided, dates still in calendar form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttachment {
    pub kind: Option<AttachmentKind>,
    pub file_id: Option<String>,
    pub time_zone: FixedOffset,
    pub display: DateConfig,
    pub expiration: DateConfig,
    pub never_expire: bool,
    pub title: Option<LocalizedMap>,
    pub options: String,
    pub priority: f64,
}

impl ResolvedAttachment {
    /// Recompose the calendar fields into instants. The expiration is
    /// dropped when the attachment never expires.
    pub fn into_fields(self) -> Result<AttachmentFields, CatalogError> {
        let kind = self
            .kind
            .ok_or_else(|| CatalogError::InvalidInput("attachment type is required".into()))?;
        let display_date = self.display.to_utc(&self.time_zone)?;
        let expiration_date = if self.never_expire {
            None
        } else {
            Some(self.expiration.to_utc(&self.time_zone)?)
        };
        Ok(AttachmentFields {
            kind,
            file_id: self.file_id,
            display_date,
            expiration_date,
            title: self.title.unwrap_or_default(),
            options: self.options,
            priority: self.priority,
        })
    }
}

/// Resolve a write against an optional existing record.
///
/// With an existing record, omitted fields keep their stored value and
/// `never_expire` keeps its prior meaning (true iff there was no expiration
/// date). Without one, `never_expire` is false, the title is absent and
/// options/priority fall back to empty/zero. Dates default to now and
/// now + `expiration_months` in either case.
pub fn merge(
    existing: Option<&AttachmentRecord>,
    incoming: &AttachmentPatch,
    policy: &DefaultPolicy,
) -> ResolvedAttachment {
    let tz = policy.time_zone();

    let display = match incoming.display_date {
        Some(date) => DateConfig::in_zone(&date, &tz),
        None => DateConfig::from_datetime(&policy.now),
    };
    let expiration = match incoming.expiration_date {
        Some(date) => DateConfig::in_zone(&date, &tz),
        None => DateConfig::from_datetime(&add_months(policy.now, policy.expiration_months)),
    };

    let never_expire = incoming
        .never_expire
        .unwrap_or_else(|| existing.is_some_and(|r| r.never_expire()));
    let title = incoming
        .title
        .clone()
        .or_else(|| existing.map(|r| r.title.clone()));
    let options = incoming
        .options
        .clone()
        .or_else(|| existing.map(|r| r.options.clone()))
        .unwrap_or_default();
    let priority = incoming
        .priority
        .or_else(|| existing.map(|r| r.priority))
        .unwrap_or_default();
    let file_id = incoming
        .file_id
        .clone()
        .or_else(|| existing.and_then(|r| r.file_id.clone()));

    ResolvedAttachment {
        kind: incoming.kind,
        file_id,
        time_zone: tz,
        display,
        expiration,
        never_expire,
        title,
        options,
        priority,
    }
}
