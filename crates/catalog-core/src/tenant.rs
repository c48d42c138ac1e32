use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::CatalogError;

/// The company a request acts on, plus the user performing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant {
    pub id: i64,
    pub user_id: i64,
    pub time_zone: FixedOffset,
}

impl Tenant {
    pub fn new(id: i64, user_id: i64, time_zone: FixedOffset) -> Self {
        Self {
            id,
            user_id,
            time_zone,
        }
    }

    pub fn utc(id: i64, user_id: i64) -> Self {
        Self::new(id, user_id, Utc.fix())
    }

    /// Build a tenant whose timezone is `minutes` east of UTC.
    pub fn with_offset_minutes(id: i64, user_id: i64, minutes: i32) -> Result<Self, CatalogError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CatalogError::InvalidInput(format!("utc offset out of range: {minutes} minutes"))
            })?;
        Ok(Self::new(id, user_id, offset))
    }

    /// Current wall-clock time in the tenant's timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.time_zone)
    }
}
