//! Discord messages and their authors.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use super::channel::Channel;
use super::file::File;
use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{Endpoints, UrlRoot};
use crate::shared::error::ClientError;

#[derive(Debug, Deserialize)]
struct UserRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(default, deserialize_with = "record::null_default")]
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    discriminator: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    avatar_decoration_data: Option<Value>,
    #[serde(default)]
    clan: Option<Value>,
    #[serde(default)]
    accent_color: Option<Value>,
    #[serde(default)]
    banner: Option<Value>,
    #[serde(default)]
    banner_color: Option<String>,
    #[serde(default, deserialize_with = "record::null_default")]
    flags: i64,
    #[serde(default, deserialize_with = "record::null_default")]
    public_flags: i64,
}

/// A Discord account. Not a [`super::Creator`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscordUser {
    pub id: String,
    /// Name used inside the guild
    pub username: String,
    pub global_name: Option<String>,
    pub discriminator: Option<String>,
    /// Avatar image on the Discord CDN
    pub avatar: Option<File>,
    pub avatar_decoration_data: Option<Value>,
    pub clan: Option<Value>,
    pub accent_color: Option<Value>,
    pub banner: Option<Value>,
    pub banner_color: Option<String>,
    pub flags: i64,
    pub public_flags: i64,
}

impl DiscordUser {
    pub fn from_record(record: Record, endpoints: &Endpoints) -> Result<Self, ClientError> {
        let row: UserRow = record::decode(record)?;

        let avatar = row.avatar.as_deref().map(|avatar| {
            File::new(
                format!("{}_avatar.png", row.username),
                format!("/avatars/{}/{}", row.id, avatar),
                None,
                UrlRoot::DiscordCdn,
                endpoints,
            )
        });

        Ok(Self {
            id: row.id,
            username: row.username,
            global_name: row.global_name,
            discriminator: row.discriminator,
            avatar,
            avatar_decoration_data: row.avatar_decoration_data,
            clan: row.clan,
            accent_color: row.accent_color,
            banner: row.banner,
            banner_color: row.banner_color,
            flags: row.flags,
            public_flags: row.public_flags,
        })
    }

    /// Global name when set, otherwise the guild username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    #[serde(deserialize_with = "record::id")]
    id: String,
    #[serde(default)]
    author: Option<Record>,
    #[serde(deserialize_with = "record::id")]
    server: String,
    #[serde(default, deserialize_with = "record::null_default")]
    content: String,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    added: Option<NaiveDateTime>,
    #[serde(deserialize_with = "record::fractional")]
    published: NaiveDateTime,
    #[serde(default, deserialize_with = "record::opt_fractional")]
    edited: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "record::null_default")]
    embeds: Vec<Value>,
    #[serde(default, deserialize_with = "record::null_default")]
    mentions: Vec<Value>,
    #[serde(default, deserialize_with = "record::null_default")]
    attachments: Vec<Record>,
}

/// A message inside a Discord channel.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub author: Option<DiscordUser>,
    pub server_id: String,
    pub content: String,
    /// When the archive picked the message up
    pub added: Option<NaiveDateTime>,
    pub published: NaiveDateTime,
    pub edited: Option<NaiveDateTime>,
    /// Passed through as returned by the API
    pub embeds: Vec<Value>,
    pub mentions: Vec<Value>,
    pub attachments: Vec<File>,
    channel: Arc<Channel>,
}

impl Message {
    pub fn from_record(record: Record, channel: &Arc<Channel>) -> Result<Self, ClientError> {
        let row: MessageRow = record::decode(record)?;
        let endpoints = channel.endpoints();

        let author = row
            .author
            .map(|author| DiscordUser::from_record(author, endpoints))
            .transpose()?;
        let attachments = row
            .attachments
            .into_iter()
            .map(|attachment| File::from_record(attachment, endpoints))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: row.id,
            author,
            server_id: row.server,
            content: row.content,
            added: row.added,
            published: row.published,
            edited: row.edited,
            embeds: row.embeds,
            mentions: row.mentions,
            attachments,
            channel: Arc::clone(channel),
        })
    }

    pub fn channel(&self) -> &Arc<Channel> {
        &self.channel
    }

    pub fn is_edited(&self) -> bool {
        self.edited.is_some()
    }

    /// `published < date`
    pub fn before(&self, date: NaiveDateTime) -> bool {
        self.published < date
    }

    /// `published >= date`
    pub fn since(&self, date: NaiveDateTime) -> bool {
        self.published >= date
    }
}
