//! Client Error Types
//!
//! Centralized error handling for every layer of the client.

use reqwest::StatusCode;

use crate::domain::value_objects::ServiceType;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid offset {offset}: must be a non-negative multiple of {page_size}")]
    InvalidOffset { offset: usize, page_size: usize },

    #[error("Invalid item cap {value}: must be greater than zero and at most {limit}")]
    InvalidItemCap { value: usize, limit: usize },

    #[error("Retries exhausted after {attempts} attempts (last status {status})")]
    RetriesExhausted { attempts: u32, status: StatusCode },

    #[error("Unexpected status {status} for {path}")]
    UnexpectedStatus { status: StatusCode, path: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid timestamp '{value}' for format '{format}'")]
    InvalidTimestamp { value: String, format: &'static str },

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Only '{expected}' is valid for this operation, not '{actual}'")]
    IncorrectService {
        expected: ServiceType,
        actual: ServiceType,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Whether this error was raised before any network call was made.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidOffset { .. }
                | ClientError::InvalidItemCap { .. }
                | ClientError::IncorrectService { .. }
        )
    }
}

/// Result alias used across the crate.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
