//! Client-side date filter.
//!
//! The API cannot filter by date, so records are filtered after their pages
//! have been fetched. `before` excludes its boundary instant, `since` includes
//! it. Narrow windows still cost a full walk of the resource.

use chrono::NaiveDateTime;

use crate::domain::value_objects::record::str_field;
use crate::domain::value_objects::{Record, TimestampFormat};
use crate::shared::error::ClientError;

/// Inclusive/exclusive publication window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub before: Option<NaiveDateTime>,
    pub since: Option<NaiveDateTime>,
}

impl DateFilter {
    pub fn new(before: Option<NaiveDateTime>, since: Option<NaiveDateTime>) -> Self {
        Self { before, since }
    }

    pub fn is_unbounded(&self) -> bool {
        self.before.is_none() && self.since.is_none()
    }

    /// `at < before` (when set) and `at >= since` (when set).
    pub fn includes(&self, at: NaiveDateTime) -> bool {
        self.before.map_or(true, |before| at < before) && self.since.map_or(true, |since| at >= since)
    }

    pub fn includes_raw(&self, raw: &str, format: TimestampFormat) -> Result<bool, ClientError> {
        if self.is_unbounded() {
            return Ok(true);
        }
        Ok(self.includes(format.parse(raw)?))
    }

    /// Apply the window to a timestamp field of a raw record.
    pub fn includes_record(
        &self,
        record: &Record,
        field: &str,
        format: TimestampFormat,
    ) -> Result<bool, ClientError> {
        if self.is_unbounded() {
            return Ok(true);
        }
        let raw = str_field(record, field)
            .ok_or_else(|| ClientError::InvalidRecord(format!("missing timestamp field '{}'", field)))?;
        self.includes_raw(raw, format)
    }
}

/// Free-standing form of [`DateFilter::includes_raw`].
pub fn included(
    raw: &str,
    format: TimestampFormat,
    before: Option<NaiveDateTime>,
    since: Option<NaiveDateTime>,
) -> Result<bool, ClientError> {
    DateFilter::new(before, since).includes_raw(raw, format)
}
