//! Timestamp formats used by the API.
//!
//! Posts publish with second precision (`2024-06-18T22:00:00`), while
//! messages, announcements, fancards and index dates carry fractional seconds
//! (`2024-07-21T13:00:00.123456`). All values are naive UTC.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::shared::error::ClientError;

/// A timestamp layout understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `%Y-%m-%dT%H:%M:%S`
    Seconds,
    /// `%Y-%m-%dT%H:%M:%S%.f`; also accepts values without a fraction
    Fractional,
}

impl TimestampFormat {
    /// The chrono format string.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Seconds => "%Y-%m-%dT%H:%M:%S",
            Self::Fractional => "%Y-%m-%dT%H:%M:%S%.f",
        }
    }

    /// Parse a raw timestamp in this format.
    pub fn parse(&self, raw: &str) -> Result<NaiveDateTime, ClientError> {
        NaiveDateTime::parse_from_str(raw.trim(), self.pattern()).map_err(|_| {
            ClientError::InvalidTimestamp {
                value: raw.to_string(),
                format: self.pattern(),
            }
        })
    }

    /// Parse either a formatted string or an epoch number (seconds).
    pub fn parse_value(&self, value: &Value) -> Result<NaiveDateTime, ClientError> {
        match value {
            Value::String(raw) => self.parse(raw),
            Value::Number(n) => n
                .as_f64()
                .and_then(|secs| {
                    let whole = secs.trunc() as i64;
                    let nanos = ((secs.fract()) * 1e9).round() as u32;
                    DateTime::from_timestamp(whole, nanos)
                })
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| ClientError::InvalidTimestamp {
                    value: n.to_string(),
                    format: "epoch seconds",
                }),
            other => Err(ClientError::InvalidTimestamp {
                value: other.to_string(),
                format: self.pattern(),
            }),
        }
    }
}
