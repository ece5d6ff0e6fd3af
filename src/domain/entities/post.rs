//! Post entity.
//!
//! A post belongs to one creator and carries a preview file plus attachments.
//! Comments, the reimport flag and prior revisions are lazy fields fetched on
//! first read. A post built as a revision never fetches revisions or its flag:
//! both fields start loaded (empty and `false`).

use std::sync::Arc;

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::comment::Comment;
use super::creator::Creator;
use super::file::File;
use crate::domain::lazy::LazyField;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{ServiceType, UrlRoot};
use crate::infrastructure::api::ApiClient;
use crate::shared::error::ClientError;

#[derive(Debug, Deserialize)]
struct PostRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(deserialize_with = "record::id")]
    user: String,
    service: ServiceType,
    #[serde(default, deserialize_with = "record::null_default")]
    title: String,
    #[serde(default, deserialize_with = "record::null_default")]
    content: String,
    #[serde(default, deserialize_with = "record::null_default")]
    substring: String,
    #[serde(default)]
    embed: Value,
    #[serde(default, deserialize_with = "record::null_default")]
    shared_file: bool,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    added: Option<NaiveDateTime>,
    #[serde(deserialize_with = "record::seconds")]
    published: NaiveDateTime,
    #[serde(default, deserialize_with = "record::opt_seconds")]
    edited: Option<NaiveDateTime>,
    #[serde(default)]
    file: Option<Record>,
    #[serde(default, deserialize_with = "record::null_default")]
    attachments: Vec<Record>,
}

/// A snapshot of a post at an earlier point in time.
#[derive(Debug, Clone)]
pub struct PostRevision {
    pub revision_id: String,
    pub post: Arc<Post>,
}

/// A post with content.
pub struct Post {
    pub id: String,
    /// Id of the creator that owns the content (not the uploader)
    pub creator_id: String,
    pub service: ServiceType,
    pub title: String,
    pub content: String,
    pub substring: String,
    pub embed: Value,
    pub shared_file: bool,
    pub added: Option<NaiveDateTime>,
    pub published: NaiveDateTime,
    pub edited: Option<NaiveDateTime>,
    /// Preview file
    pub file: Option<File>,
    pub attachments: Vec<File>,
    creator: Option<Arc<Creator>>,
    is_revision: bool,
    client: ApiClient,
    comments: LazyField<Vec<Comment>>,
    flagged: LazyField<bool>,
    revisions: LazyField<Vec<PostRevision>>,
}

impl Post {
    /// Build a post from a raw record.
    ///
    /// `creator` is `None` when the owning creator could not be resolved.
    pub fn from_record(
        record: Record,
        creator: Option<Arc<Creator>>,
        client: &ApiClient,
    ) -> Result<Self, ClientError> {
        Self::build(record, creator, client, false)
    }

    /// Build a post that represents a revision of another one.
    pub fn revision_from_record(
        record: Record,
        creator: Option<Arc<Creator>>,
        client: &ApiClient,
    ) -> Result<Self, ClientError> {
        Self::build(record, creator, client, true)
    }

    fn build(
        record: Record,
        creator: Option<Arc<Creator>>,
        client: &ApiClient,
        is_revision: bool,
    ) -> Result<Self, ClientError> {
        let row: PostRow = record::decode(record)?;
        let endpoints = client.endpoints();

        // An absent preview arrives as `{}`.
        let file = match row.file {
            Some(file) if file.contains_key("path") => Some(File::from_record(file, endpoints)?),
            _ => None,
        };
        let attachments = row
            .attachments
            .into_iter()
            .map(|attachment| File::from_record(attachment, endpoints))
            .collect::<Result<Vec<_>, _>>()?;

        let (flagged, revisions) = if is_revision {
            (LazyField::loaded(false), LazyField::loaded(Vec::new()))
        } else {
            (LazyField::new(), LazyField::new())
        };

        Ok(Self {
            id: row.id,
            creator_id: row.user,
            service: row.service,
            title: row.title,
            content: row.content,
            substring: row.substring,
            embed: row.embed,
            shared_file: row.shared_file,
            added: row.added,
            published: row.published,
            edited: row.edited,
            file,
            attachments,
            creator,
            is_revision,
            client: client.clone(),
            comments: LazyField::new(),
            flagged,
            revisions,
        })
    }

    pub fn creator(&self) -> Option<&Arc<Creator>> {
        self.creator.as_ref()
    }

    pub fn is_revision(&self) -> bool {
        self.is_revision
    }

    fn api_path(&self) -> String {
        format!("/{}/user/{}/post/{}", self.service, self.creator_id, self.id)
    }

    pub fn url(&self) -> String {
        self.client.endpoints().url(UrlRoot::Site, &self.api_path())
    }

    /// Preview file first, then attachments.
    pub fn all_files(&self) -> Vec<&File> {
        self.file.iter().chain(self.attachments.iter()).collect()
    }

    /// `published < date`
    pub fn before(&self, date: NaiveDateTime) -> bool {
        self.published < date
    }

    /// `published >= date`
    pub fn since(&self, date: NaiveDateTime) -> bool {
        self.published >= date
    }

    /// Comments of the post, fetched once.
    pub async fn comments(self: &Arc<Self>) -> Result<Arc<Vec<Comment>>, ClientError> {
        self.comments.get_or_load(|| self.fetch_comments()).await
    }

    /// Whether the post is flagged for reimport, fetched once.
    pub async fn flagged(&self) -> Result<bool, ClientError> {
        let flagged = self.flagged.get_or_load(|| self.fetch_flagged()).await?;
        Ok(*flagged)
    }

    /// Earlier versions of the post, fetched once.
    pub async fn revisions(&self) -> Result<Arc<Vec<PostRevision>>, ClientError> {
        self.revisions.get_or_load(|| self.fetch_revisions()).await
    }

    #[instrument(skip(self), fields(post_id = %self.id))]
    async fn fetch_comments(self: &Arc<Self>) -> Result<Vec<Comment>, ClientError> {
        let path = format!("{}/comments", self.api_path());
        self.client
            .get_records(&path)
            .await?
            .into_iter()
            .map(|record| Comment::from_record(record, self))
            .collect()
    }

    /// 200 means flagged, 404 means not flagged.
    async fn fetch_flagged(&self) -> Result<bool, ClientError> {
        let path = format!("{}/flag", self.api_path());
        match self.client.get_status(&path).await? {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ClientError::UnexpectedStatus { status, path }),
        }
    }

    #[instrument(skip(self), fields(post_id = %self.id))]
    async fn fetch_revisions(&self) -> Result<Vec<PostRevision>, ClientError> {
        let path = format!("{}/revisions", self.api_path());
        self.client
            .get_records(&path)
            .await?
            .into_iter()
            .map(|record| {
                let revision_id = match record.get("revision_id") {
                    Some(Value::String(id)) => id.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                let post = Post::revision_from_record(record, self.creator.clone(), &self.client)?;
                Ok(PostRevision {
                    revision_id,
                    post: Arc::new(post),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Post")
            .field("id", &self.id)
            .field("creator_id", &self.creator_id)
            .field("service", &self.service)
            .field("title", &self.title)
            .field("is_revision", &self.is_revision)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Post '{}' ({}) by {}>", self.title, self.id, self.creator_id)
    }
}
