//! Raw records.
//!
//! A record is one JSON object from an API page, handed as-is to the entity
//! factories. The helpers below are `deserialize_with` adapters for the
//! loosely typed fields the API returns.

use chrono::NaiveDateTime;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use super::timestamp::TimestampFormat;
use crate::shared::error::ClientError;

/// One raw record: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Deserialize a record into a typed row.
pub fn decode<T: DeserializeOwned>(record: Record) -> Result<T, ClientError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| ClientError::InvalidRecord(e.to_string()))
}

/// Read a string field without consuming the record.
pub fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

fn id_from_value<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected string or number id, got {}", other))),
    }
}

/// Ids arrive as strings or integers depending on the endpoint.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    id_from_value(Value::deserialize(deserializer)?)
}

pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => id_from_value(value).map(Some),
    }
}

/// `null` is treated like a missing field.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
    format: TimestampFormat,
) -> Result<NaiveDateTime, D::Error> {
    let value = Value::deserialize(deserializer)?;
    format.parse_value(&value).map_err(serde::de::Error::custom)
}

fn opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
    format: TimestampFormat,
) -> Result<Option<NaiveDateTime>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => format
            .parse_value(&value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    timestamp(d, TimestampFormat::Seconds)
}

pub fn opt_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    opt_timestamp(d, TimestampFormat::Seconds)
}

pub fn fractional<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    timestamp(d, TimestampFormat::Fractional)
}

pub fn opt_fractional<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    opt_timestamp(d, TimestampFormat::Fractional)
}
