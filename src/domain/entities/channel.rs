//! Discord channels.
//!
//! A Discord "creator" is really a guild; its id is the server id of every
//! channel it owns. Messages are walked like posts but with pages of 150 and
//! fractional-second timestamps.

use std::sync::{Arc, Weak};

use serde::Deserialize;
use tracing::{info, instrument};

use super::creator::Creator;
use super::message::Message;
use crate::domain::services::DateFilter;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{Endpoints, TimestampFormat, UrlRoot};
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::pagination::{FetchMode, PageRequest, MESSAGES_PAGE_SIZE};
use crate::shared::error::ClientError;

/// Parameters of a message walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Messages to look through; `None` walks the whole channel
    pub max_messages: Option<usize>,
    pub filter: DateFilter,
    pub mode: FetchMode,
}

#[derive(Debug, Deserialize)]
struct ChannelRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(default, deserialize_with = "record::null_default")]
    name: String,
}

/// A channel of a Discord server.
pub struct Channel {
    pub id: String,
    pub name: String,
    server_id: String,
    creator: Weak<Creator>,
    client: ApiClient,
}

impl Channel {
    pub fn from_record(record: Record, creator: &Arc<Creator>) -> Result<Self, ClientError> {
        let row: ChannelRow = record::decode(record)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            server_id: creator.id.clone(),
            creator: Arc::downgrade(creator),
            client: creator.client().clone(),
        })
    }

    /// Id of the guild; always the owning creator's id.
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// The owning creator, while it is still alive.
    pub fn creator(&self) -> Option<Arc<Creator>> {
        self.creator.upgrade()
    }

    pub(crate) fn endpoints(&self) -> &Endpoints {
        self.client.endpoints()
    }

    pub fn url(&self) -> String {
        format!(
            "{}/discord/server/{}#{}",
            self.client.endpoints().resolve(UrlRoot::Site),
            self.server_id,
            self.id
        )
    }

    /// Walk the channel's messages and keep those inside the date window.
    #[instrument(skip(self, query), fields(channel_id = %self.id))]
    pub async fn messages(self: &Arc<Self>, query: &MessageQuery) -> Result<Vec<Message>, ClientError> {
        let request = PageRequest::new(format!("/discord/channel/{}", self.id), MESSAGES_PAGE_SIZE)
            .with_max_items(query.max_messages);
        let records = self.client.walk(&request, query.mode).await?;
        let fetched = records.len();

        let mut messages = Vec::with_capacity(fetched);
        for record in records {
            if !query
                .filter
                .includes_record(&record, "published", TimestampFormat::Fractional)?
            {
                continue;
            }
            messages.push(Message::from_record(record, self)?);
        }

        info!(fetched, kept = messages.len(), "Loaded channel messages");
        Ok(messages)
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("server_id", &self.server_id)
            .finish_non_exhaustive()
    }
}
