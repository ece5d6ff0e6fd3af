//! Service identifiers.
//!
//! Every creator lives on exactly one upstream service. The API speaks in
//! lowercase service names; this enum is the closed set the client accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::error::ClientError;

/// Upstream service that provides a creator's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    Patreon,
    Fanbox,
    Gumroad,
    SubscribeStar,
    Fantia,
    Boosty,
    Afdian,
    Discord,
    Dlsite,
}

impl ServiceType {
    /// All known services, in API listing order.
    pub const ALL: [ServiceType; 9] = [
        Self::Patreon,
        Self::Fanbox,
        Self::Gumroad,
        Self::SubscribeStar,
        Self::Fantia,
        Self::Boosty,
        Self::Afdian,
        Self::Discord,
        Self::Dlsite,
    ];

    /// Wire representation used in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patreon => "patreon",
            Self::Fanbox => "fanbox",
            Self::Gumroad => "gumroad",
            Self::SubscribeStar => "subscribestar",
            Self::Fantia => "fantia",
            Self::Boosty => "boosty",
            Self::Afdian => "afdian",
            Self::Discord => "discord",
            Self::Dlsite => "dlsite",
        }
    }

    /// Fails with `IncorrectService` unless `self` is `expected`.
    pub fn require(self, expected: ServiceType) -> Result<(), ClientError> {
        if self == expected {
            Ok(())
        } else {
            Err(ClientError::IncorrectService {
                expected,
                actual: self,
            })
        }
    }
}

impl FromStr for ServiceType {
    type Err = ClientError;

    /// Permissive parse: case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == normalized)
            .ok_or_else(|| ClientError::UnknownService(s.to_string()))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ServiceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
