//! Post comments and their edit history.

use std::sync::{Arc, Weak};

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::post::Post;
use crate::domain::value_objects::record::{self, Record};
use crate::shared::error::ClientError;

/// An earlier version of a comment's content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentRevision {
    #[serde(deserialize_with = "record::id")]
    pub id: String,
    #[serde(default, deserialize_with = "record::null_default")]
    pub content: String,
    #[serde(deserialize_with = "record::fractional")]
    pub added: NaiveDateTime,
}

impl CommentRevision {
    pub fn from_record(record: Record) -> Result<Self, ClientError> {
        record::decode(record)
    }
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(default, deserialize_with = "record::opt_id")]
    parent_id: Option<String>,
    #[serde(deserialize_with = "record::id")]
    commenter: String,
    #[serde(default, deserialize_with = "record::null_default")]
    commenter_name: String,
    #[serde(default, deserialize_with = "record::null_default")]
    content: String,
    #[serde(deserialize_with = "record::fractional")]
    published: NaiveDateTime,
    #[serde(default, deserialize_with = "record::null_default")]
    revisions: Vec<CommentRevision>,
}

/// A comment under a post.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: String,
    /// Set when the comment answers another comment
    pub parent_id: Option<String>,
    pub commenter_id: String,
    pub commenter_name: String,
    pub content: String,
    pub published: NaiveDateTime,
    pub revisions: Vec<CommentRevision>,
    post: Weak<Post>,
    post_url: String,
}

impl Comment {
    pub fn from_record(record: Record, post: &Arc<Post>) -> Result<Self, ClientError> {
        let row: CommentRow = record::decode(record)?;
        Ok(Self {
            id: row.id,
            parent_id: row.parent_id,
            commenter_id: row.commenter,
            commenter_name: row.commenter_name,
            content: row.content,
            published: row.published,
            revisions: row.revisions,
            post: Arc::downgrade(post),
            post_url: post.url(),
        })
    }

    /// The post this comment belongs to, while it is still alive.
    pub fn post(&self) -> Option<Arc<Post>> {
        self.post.upgrade()
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_edited(&self) -> bool {
        !self.revisions.is_empty()
    }

    pub fn url(&self) -> String {
        format!("{}#{}", self.post_url, self.id)
    }
}
