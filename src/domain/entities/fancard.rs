//! Fanbox fancards.
//!
//! A fancard is the image a supporter holds as proof of support. Its file is
//! content-addressed by `hash` on the data mirror.

use std::sync::{Arc, Weak};

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::creator::Creator;
use super::file::File;
use crate::domain::value_objects::record::{self, Record};
use crate::shared::error::ClientError;

#[derive(Debug, Deserialize)]
struct FancardRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(deserialize_with = "record::id")]
    user_id: String,
    #[serde(deserialize_with = "record::id")]
    file_id: String,
    #[serde(default, deserialize_with = "record::null_default")]
    size: u64,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default, deserialize_with = "record::null_default")]
    ext: String,
    #[serde(default, deserialize_with = "record::null_default")]
    price: String,
    hash: String,
    #[serde(default)]
    ihash: Option<String>,
    #[serde(deserialize_with = "record::fractional")]
    last_checked_at: NaiveDateTime,
    #[serde(deserialize_with = "record::fractional")]
    added: NaiveDateTime,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    mtime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    ctime: Option<NaiveDateTime>,
}

/// A supporter card of a Fanbox creator.
#[derive(Debug, Clone)]
pub struct Fancard {
    pub id: String,
    pub creator_id: String,
    pub file_id: String,
    pub file_size: u64,
    pub file: File,
    /// Price tag of the tier
    pub price: String,
    pub hash: String,
    pub ihash: Option<String>,
    pub last_checked: NaiveDateTime,
    pub added: NaiveDateTime,
    pub mtime: Option<NaiveDateTime>,
    pub ctime: Option<NaiveDateTime>,
    creator: Weak<Creator>,
}

impl Fancard {
    pub fn from_record(record: Record, creator: &Arc<Creator>) -> Result<Self, ClientError> {
        let row: FancardRow = record::decode(record)?;

        let owner = creator.name.as_deref().unwrap_or(&creator.id);
        let file = File::from_digest(
            format!("{}_{}{}", owner, row.file_id, row.ext),
            &row.hash,
            &row.ext,
            row.mime,
            creator.client().endpoints(),
        );

        Ok(Self {
            id: row.id,
            creator_id: row.user_id,
            file_id: row.file_id,
            file_size: row.size,
            file,
            price: row.price,
            hash: row.hash,
            ihash: row.ihash,
            last_checked: row.last_checked_at,
            added: row.added,
            mtime: row.mtime,
            ctime: row.ctime,
            creator: Arc::downgrade(creator),
        })
    }

    pub fn creator(&self) -> Option<Arc<Creator>> {
        self.creator.upgrade()
    }
}
