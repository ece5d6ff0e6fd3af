//! Creator announcements (mostly Patreon).

use std::sync::{Arc, Weak};

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::creator::Creator;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::ServiceType;
use crate::shared::error::ClientError;

#[derive(Debug, Deserialize)]
struct AnnouncementRow {
    service: ServiceType,
    #[serde(deserialize_with = "record::id")]
    user_id: String,
    #[serde(default, deserialize_with = "record::null_default")]
    hash: String,
    #[serde(default, deserialize_with = "record::null_default")]
    content: String,
    #[serde(deserialize_with = "record::fractional")]
    added: NaiveDateTime,
}

/// An announcement posted by a creator. `content` may contain HTML.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub service: ServiceType,
    pub creator_id: String,
    pub hash: String,
    pub content: String,
    pub added: NaiveDateTime,
    creator: Weak<Creator>,
}

impl Announcement {
    pub fn from_record(record: Record, creator: &Arc<Creator>) -> Result<Self, ClientError> {
        let row: AnnouncementRow = record::decode(record)?;
        Ok(Self {
            service: row.service,
            creator_id: row.user_id,
            hash: row.hash,
            content: row.content,
            added: row.added,
            creator: Arc::downgrade(creator),
        })
    }

    pub fn creator(&self) -> Option<Arc<Creator>> {
        self.creator.upgrade()
    }
}
