use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Months, TimeZone, Timelike, Utc};

use crate::CatalogError;

/// Calendar fields of a point in time, as seen from one timezone.
///
/// Months are 1-based. Seconds are not carried: recomposing a `DateConfig`
/// truncates to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateConfig {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl DateConfig {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    /// Calendar fields of `instant` in the timezone `tz`.
    pub fn in_zone(instant: &DateTime<Utc>, tz: &FixedOffset) -> Self {
        Self::from_datetime(&instant.with_timezone(tz))
    }

    /// Recompose the fields in `tz` and return the UTC instant.
    pub fn to_utc(&self, tz: &FixedOffset) -> Result<DateTime<Utc>, CatalogError> {
        tz.with_ymd_and_hms(self.year, self.month, self.day, self.hour, self.minute, 0)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| CatalogError::InvalidDate(self.to_string()))
    }
}

impl fmt::Display for DateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// `dt` moved forward by whole calendar months. The day is clamped to the
/// last day of the target month, so Jan 31 + 1 month is Feb 28/29.
pub fn add_months(dt: DateTime<FixedOffset>, months: u32) -> DateTime<FixedOffset> {
    dt.checked_add_months(Months::new(months)).unwrap_or(dt)
}
