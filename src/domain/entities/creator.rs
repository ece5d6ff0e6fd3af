//! Creator entity.
//!
//! Creators are handed out as `Arc<Creator>`: posts keep a strong reference to
//! their creator, while the memoized children (announcements, fancards,
//! channels) point back through `Weak` so the creator and its caches can be
//! dropped together.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::announcement::Announcement;
use super::channel::Channel;
use super::fancard::Fancard;
use super::post::Post;
use crate::domain::lazy::LazyField;
use crate::domain::services::DateFilter;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{ServiceType, TimestampFormat, UrlRoot};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::pagination::{FetchMode, PageRequest, POSTS_PAGE_SIZE};
use crate::shared::error::ClientError;

/// Parameters of a creator's post walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Free-text search
    pub query: Option<String>,
    /// Posts to look through, not the number returned; `None` walks everything
    pub max_posts: Option<usize>,
    pub filter: DateFilter,
    pub mode: FetchMode,
}


#[derive(Debug, Deserialize)]
struct CreatorRow {
    #[serde(default, deserialize_with = "record::opt_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "record::opt_id")]
    user: Option<String>,
    #[serde(default)]
    name: Option<String>,
    service: ServiceType,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    indexed: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    updated: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "record::opt_id")]
    public_id: Option<String>,
    #[serde(default)]
    favorited: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LinkRow {
    service: ServiceType,
    #[serde(deserialize_with = "record::id")]
    id: String,
}

/// An account on one upstream service.
pub struct Creator {
    pub id: String,
    pub name: Option<String>,
    pub service: ServiceType,
    pub indexed: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    pub public_id: Option<String>,
    pub favorited: Option<i64>,
    client: ApiClient,
    announcements: LazyField<Vec<Announcement>>,
    fancards: LazyField<Vec<Fancard>>,
    channels: LazyField<Vec<Arc<Channel>>>,
}

impl Creator {
    /// Build a creator from a profile or listing record.
    ///
    /// The identity is read from `id`, falling back to `user`.
    pub fn from_record(record: Record, client: &ApiClient) -> Result<Self, ClientError> {
        let row: CreatorRow = record::decode(record)?;
        let id = row
            .id
            .or(row.user)
            .ok_or_else(|| ClientError::InvalidRecord("creator record has no 'id' or 'user'".into()))?;

        Ok(Self {
            id,
            name: row.name,
            service: row.service,
            indexed: row.indexed,
            updated: row.updated,
            public_id: row.public_id,
            favorited: row.favorited,
            client: client.clone(),
            announcements: LazyField::new(),
            fancards: LazyField::new(),
            channels: LazyField::new(),
        })
    }

    /// Look a creator up by profile; `None` when the profile does not exist.
    #[instrument(skip(client))]
    pub async fn from_profile(
        client: &ApiClient,
        service: ServiceType,
        creator_id: &str,
    ) -> Result<Option<Self>, ClientError> {
        let path = format!("/{}/user/{}/profile", service, creator_id);
        match client.get_json::<Record>(&path).await? {
            Some(record) => Self::from_record(record, client).map(Some),
            None => {
                debug!("Creator profile not found");
                Ok(None)
            }
        }
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    fn api_path(&self) -> String {
        format!("/{}/user/{}", self.service, self.id)
    }

    pub fn url(&self) -> String {
        self.client.endpoints().url(UrlRoot::Site, &self.api_path())
    }

    /// Walk the creator's posts and keep those inside the date window.
    ///
    /// # Errors
    ///
    /// `InvalidItemCap` when `max_posts` is zero, before any request.
    #[instrument(skip(self, query), fields(service = %self.service, creator_id = %self.id))]
    pub async fn posts(self: &Arc<Self>, query: &PostQuery) -> Result<Vec<Arc<Post>>, ClientError> {
        let request = PageRequest::new(self.api_path(), POSTS_PAGE_SIZE)
            .with_query(query.query.clone())
            .with_max_items(query.max_posts);
        let records = self.client.walk(&request, query.mode).await?;
        let fetched = records.len();

        let mut posts = Vec::with_capacity(fetched);
        for record in records {
            if !query
                .filter
                .includes_record(&record, "published", TimestampFormat::Seconds)?
            {
                continue;
            }
            posts.push(Arc::new(Post::from_record(
                record,
                Some(Arc::clone(self)),
                &self.client,
            )?));
        }

        info!(fetched, kept = posts.len(), "Loaded creator posts");
        Ok(posts)
    }

    /// A single post by id; `None` when it does not exist.
    pub async fn get_post(self: &Arc<Self>, post_id: &str) -> Result<Option<Arc<Post>>, ClientError> {
        let path = format!("{}/post/{}", self.api_path(), post_id);
        let Some(mut record) = self.client.get_json::<Record>(&path).await? else {
            return Ok(None);
        };

        // Some deployments wrap the post: `{"post": {...}, ...}`.
        if !record.contains_key("id") {
            if let Some(serde_json::Value::Object(inner)) = record.remove("post") {
                record = inner;
            }
        }

        Post::from_record(record, Some(Arc::clone(self)), &self.client)
            .map(|post| Some(Arc::new(post)))
    }

    /// Accounts of the same creator on other services.
    #[instrument(skip(self), fields(service = %self.service, creator_id = %self.id))]
    pub async fn other_links(&self) -> Result<Vec<Arc<Creator>>, ClientError> {
        let path = format!("{}/links", self.api_path());
        let mut links = Vec::new();

        for record in self.client.get_records(&path).await? {
            let link: LinkRow = record::decode(record)?;
            if let Some(creator) = Creator::from_profile(&self.client, link.service, &link.id).await? {
                links.push(Arc::new(creator));
            }
        }

        Ok(links)
    }

    /// Announcements, fetched once.
    pub async fn announcements(self: &Arc<Self>) -> Result<Arc<Vec<Announcement>>, ClientError> {
        self.announcements
            .get_or_load(|| self.fetch_announcements())
            .await
    }

    /// Fancards, fetched once. Empty without a request unless the creator is on Fanbox.
    pub async fn fancards(self: &Arc<Self>) -> Result<Arc<Vec<Fancard>>, ClientError> {
        self.fancards.get_or_load(|| self.fetch_fancards()).await
    }

    /// Discord channels, fetched once. Empty without a request unless the creator is on Discord.
    pub async fn channels(self: &Arc<Self>) -> Result<Arc<Vec<Arc<Channel>>>, ClientError> {
        self.channels.get_or_load(|| self.fetch_channels()).await
    }

    /// One channel of this Discord server, looked up fresh.
    ///
    /// # Errors
    ///
    /// `IncorrectService` unless the creator is on Discord.
    pub async fn get_channel(self: &Arc<Self>, channel_id: &str) -> Result<Option<Arc<Channel>>, ClientError> {
        self.service.require(ServiceType::Discord)?;

        for record in self.channel_records().await? {
            let matches = record
                .get("id")
                .map(|id| match id {
                    serde_json::Value::String(s) => s == channel_id,
                    other => other.to_string() == channel_id,
                })
                .unwrap_or(false);
            if matches {
                return Channel::from_record(record, self).map(|channel| Some(Arc::new(channel)));
            }
        }

        Ok(None)
    }

    #[instrument(skip(self), fields(creator_id = %self.id))]
    async fn fetch_announcements(self: &Arc<Self>) -> Result<Vec<Announcement>, ClientError> {
        let path = format!("{}/announcements", self.api_path());
        self.client
            .get_records(&path)
            .await?
            .into_iter()
            .map(|record| Announcement::from_record(record, self))
            .collect()
    }

    async fn fetch_fancards(self: &Arc<Self>) -> Result<Vec<Fancard>, ClientError> {
        if self.service != ServiceType::Fanbox {
            return Ok(Vec::new());
        }

        let path = format!("{}/fancards", self.api_path());
        self.client
            .get_records(&path)
            .await?
            .into_iter()
            .map(|record| Fancard::from_record(record, self))
            .collect()
    }

    async fn fetch_channels(self: &Arc<Self>) -> Result<Vec<Arc<Channel>>, ClientError> {
        if self.service != ServiceType::Discord {
            return Ok(Vec::new());
        }

        self.channel_records()
            .await?
            .into_iter()
            .map(|record| Channel::from_record(record, self).map(Arc::new))
            .collect()
    }

    async fn channel_records(&self) -> Result<Vec<Record>, ClientError> {
        self.client
            .get_records(&format!("/discord/channel/lookup/{}", self.id))
            .await
    }
}

impl std::fmt::Debug for Creator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creator")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Creator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Creator '{}' ({}) on {}>",
            self.name.as_deref().unwrap_or("?"),
            self.id,
            self.service
        )
    }
}
