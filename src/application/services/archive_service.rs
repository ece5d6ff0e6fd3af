//! Archive Service
//!
//! Top-level lookups that do not start from an entity: the creator index, the
//! global post listing, profile lookups, search by file digest and the API
//! version.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::domain::services::DateFilter;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{ServiceType, TimestampFormat};
use crate::domain::{Creator, File, FileHashResult, Message, Post};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::pagination::{FetchMode, PageRequest, POSTS_PAGE_SIZE};
use crate::shared::error::ClientError;

/// Archive service trait
#[async_trait]
pub trait ArchiveService: Send + Sync {
    /// Every creator in the archive. Expensive: the index is large.
    async fn get_creators(&self) -> Result<Vec<Arc<Creator>>, ClientError>;

    /// Search the global post listing
    async fn get_posts(&self, query: &GlobalPostQuery) -> Result<Vec<Arc<Post>>, ClientError>;

    /// Look up a creator profile; `None` when it does not exist
    async fn get_creator(&self, service: ServiceType, creator_id: &str) -> Result<Option<Arc<Creator>>, ClientError>;

    /// Accounts linked to a creator; empty when the creator does not exist
    async fn get_creator_links(&self, service: ServiceType, creator_id: &str) -> Result<Vec<Arc<Creator>>, ClientError>;

    /// Find a file by SHA-256 digest and everything that references it
    async fn get_file_hash(&self, hash: &str) -> Result<FileHashResult, ClientError>;

    /// Commit hash of the deployed API
    async fn get_app_version(&self) -> Result<String, ClientError>;
}

/// Parameters of a global post search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPostQuery {
    pub query: Option<String>,
    /// Posts to look through; must be within `1..=max_posts_limit`
    pub max_posts: usize,
    pub filter: DateFilter,
    pub mode: FetchMode,
}

impl Default for GlobalPostQuery {
    fn default() -> Self {
        Self {
            query: None,
            max_posts: POSTS_PAGE_SIZE,
            filter: DateFilter::default(),
            mode: FetchMode::Sequential,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HashRow {
    #[serde(default, deserialize_with = "record::null_default")]
    ext: String,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default, deserialize_with = "record::null_default")]
    posts: Vec<Record>,
    #[serde(default, deserialize_with = "record::null_default")]
    discord_posts: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct OwnerRow {
    service: ServiceType,
    #[serde(deserialize_with = "record::id")]
    user: String,
}

#[derive(Debug, Deserialize)]
struct MessageOwnerRow {
    #[serde(deserialize_with = "record::id")]
    server: String,
    #[serde(deserialize_with = "record::id")]
    channel: String,
}

/// Profile lookups memoized for the duration of one call.
struct CreatorCache<'a> {
    client: &'a ApiClient,
    entries: HashMap<(ServiceType, String), Option<Arc<Creator>>>,
}

impl<'a> CreatorCache<'a> {
    fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            entries: HashMap::new(),
        }
    }

    async fn resolve(&mut self, service: ServiceType, creator_id: &str) -> Result<Option<Arc<Creator>>, ClientError> {
        let key = (service, creator_id.to_string());
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }

        let creator = Creator::from_profile(self.client, service, creator_id)
            .await?
            .map(Arc::new);
        self.entries.insert(key, creator.clone());
        Ok(creator)
    }

    /// Resolve the owner of a post record and build the post.
    async fn post(&mut self, record: Record) -> Result<Arc<Post>, ClientError> {
        let owner: OwnerRow = record::decode(record.clone())?;
        let creator = self.resolve(owner.service, &owner.user).await?;
        if creator.is_none() {
            debug!(service = %owner.service, creator_id = %owner.user, "Post owner not found");
        }
        Post::from_record(record, creator, self.client).map(Arc::new)
    }
}

/// ArchiveService implementation
#[derive(Debug, Clone)]
pub struct ArchiveServiceImpl {
    client: ApiClient,
}

impl ArchiveServiceImpl {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn check_max_posts(&self, max_posts: usize) -> Result<(), ClientError> {
        let limit = self.client.options().max_posts_limit;
        if max_posts == 0 || max_posts > limit {
            return Err(ClientError::InvalidItemCap {
                value: max_posts,
                limit,
            });
        }
        Ok(())
    }

    /// Build a hash-search message through its server's channel lookup.
    ///
    /// `None` when the server or the channel can no longer be found.
    async fn hash_message(
        &self,
        cache: &mut CreatorCache<'_>,
        mut record: Record,
    ) -> Result<Option<Message>, ClientError> {
        let owner: MessageOwnerRow = record::decode(record.clone())?;

        let Some(creator) = cache.resolve(ServiceType::Discord, &owner.server).await? else {
            warn!(server = %owner.server, "Skipping message of unknown Discord server");
            return Ok(None);
        };
        let Some(channel) = creator.get_channel(&owner.channel).await? else {
            warn!(server = %owner.server, channel = %owner.channel, "Skipping message of unknown channel");
            return Ok(None);
        };

        // Search hits carry the matched text in `substring` only.
        let content = record.remove("substring").unwrap_or(Value::String(String::new()));
        record.insert("content".to_string(), content);

        Message::from_record(record, &channel).map(Some)
    }
}

#[async_trait]
impl ArchiveService for ArchiveServiceImpl {
    #[instrument(skip(self))]
    async fn get_creators(&self) -> Result<Vec<Arc<Creator>>, ClientError> {
        let creators = self
            .client
            .get_records("/creators.txt")
            .await?
            .into_iter()
            .map(|record| Creator::from_record(record, &self.client).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = creators.len(), "Loaded creator index");
        Ok(creators)
    }

    #[instrument(skip(self, query), fields(max_posts = query.max_posts))]
    async fn get_posts(&self, query: &GlobalPostQuery) -> Result<Vec<Arc<Post>>, ClientError> {
        self.check_max_posts(query.max_posts)?;

        let request = PageRequest::new("/posts", POSTS_PAGE_SIZE)
            .with_query(query.query.clone())
            .with_max_items(Some(query.max_posts));
        let records = self.client.walk(&request, query.mode).await?;
        let fetched = records.len();

        let mut cache = CreatorCache::new(&self.client);
        let mut posts = Vec::with_capacity(fetched);
        for record in records {
            if !query
                .filter
                .includes_record(&record, "published", TimestampFormat::Seconds)?
            {
                continue;
            }
            posts.push(cache.post(record).await?);
        }

        info!(fetched, kept = posts.len(), "Loaded global posts");
        Ok(posts)
    }

    async fn get_creator(&self, service: ServiceType, creator_id: &str) -> Result<Option<Arc<Creator>>, ClientError> {
        Ok(Creator::from_profile(&self.client, service, creator_id)
            .await?
            .map(Arc::new))
    }

    async fn get_creator_links(&self, service: ServiceType, creator_id: &str) -> Result<Vec<Arc<Creator>>, ClientError> {
        match self.get_creator(service, creator_id).await? {
            Some(creator) => creator.other_links().await,
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self))]
    async fn get_file_hash(&self, hash: &str) -> Result<FileHashResult, ClientError> {
        let path = format!("/search_hash/{}", hash);
        let Some(row) = self.client.get_json::<HashRow>(&path).await? else {
            debug!("No file with this digest");
            return Ok(FileHashResult::empty());
        };

        let file = File::from_digest(
            format!("{}{}", hash, row.ext),
            hash,
            &row.ext,
            row.mime,
            self.client.endpoints(),
        );

        let mut cache = CreatorCache::new(&self.client);

        let mut posts = Vec::with_capacity(row.posts.len());
        for record in row.posts {
            posts.push(cache.post(record).await?);
        }

        let mut messages = Vec::with_capacity(row.discord_posts.len());
        for record in row.discord_posts {
            if let Some(message) = self.hash_message(&mut cache, record).await? {
                messages.push(message);
            }
        }

        info!(posts = posts.len(), messages = messages.len(), "Resolved file digest");
        Ok(FileHashResult::new(file, posts, messages))
    }

    async fn get_app_version(&self) -> Result<String, ClientError> {
        Ok(self.client.get_text("/app_version").await?.trim().to_string())
    }
}
