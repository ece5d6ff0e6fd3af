//! # Kemono Client
//!
//! Command-line front end over the archive client.
//!
//! Loads settings, builds the client stack and runs one subcommand. Logs go to
//! stderr; results go to stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing::info;

use kemono_client::application::services::{ArchiveService, GlobalPostQuery};
use kemono_client::config::Settings;
use kemono_client::domain::services::DateFilter;
use kemono_client::domain::{Creator, MessageQuery, PostQuery, ServiceType};
use kemono_client::startup::Application;

#[derive(Parser)]
#[command(name = "kemono", author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "KEMONO_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a creator profile
    Creator {
        service: ServiceType,
        creator_id: String,
        /// Also list linked accounts
        #[arg(long)]
        links: bool,
    },
    /// List posts of a creator, or of the whole archive when no creator is given
    Posts {
        #[arg(long, requires = "creator")]
        service: Option<ServiceType>,
        #[arg(long, requires = "service")]
        creator: Option<String>,
        #[arg(short, long)]
        query: Option<String>,
        /// Posts to look through
        #[arg(short, long, default_value_t = 50)]
        max: usize,
        /// Walk every post of the creator
        #[arg(long, conflicts_with = "max")]
        all: bool,
        #[command(flatten)]
        window: Window,
        #[arg(long)]
        concurrent: bool,
    },
    /// List the channels of a Discord server
    Channels { server_id: String },
    /// List messages of a Discord channel
    Messages {
        server_id: String,
        channel_id: String,
        /// Messages to look through; all when omitted
        #[arg(short, long)]
        max: Option<usize>,
        #[command(flatten)]
        window: Window,
        #[arg(long)]
        concurrent: bool,
    },
    /// Find a file and its references by SHA-256 digest
    Hash { digest: String },
    /// Print the deployed API version
    Version,
    /// Download every file of a post
    Download {
        service: ServiceType,
        creator_id: String,
        post_id: String,
        /// Target directory; defaults to the configured one
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(clap::Args)]
struct Window {
    /// Keep entries published strictly before this date
    #[arg(long, value_parser = parse_date)]
    before: Option<NaiveDateTime>,
    /// Keep entries published at or after this date
    #[arg(long, value_parser = parse_date)]
    since: Option<NaiveDateTime>,
}

impl Window {
    fn filter(&self) -> DateFilter {
        DateFilter::new(self.before, self.since)
    }
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
fn parse_date(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(at);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    kemono_client::telemetry::init_tracing(cli.log_json);

    let settings = Settings::load().context("failed to load configuration")?;
    info!(
        environment = %settings.environment,
        api = %settings.api.api_url,
        "Configuration loaded"
    );

    let app = Application::build(settings)?;
    run(&app, cli.command).await
}

async fn run(app: &Application, command: Commands) -> Result<()> {
    match command {
        Commands::Creator {
            service,
            creator_id,
            links,
        } => {
            let creator = require_creator(app, service, &creator_id).await?;
            println!("{}", creator);
            println!("  {}", creator.url());
            if links {
                for link in creator.other_links().await? {
                    println!("  linked: {} {}", link, link.url());
                }
            }
        }
        Commands::Posts {
            service,
            creator,
            query,
            max,
            all,
            window,
            concurrent,
        } => {
            let mode = app.client.fetch_mode(concurrent);
            let posts = match (service, creator) {
                (Some(service), Some(creator_id)) => {
                    let creator = require_creator(app, service, &creator_id).await?;
                    let query = PostQuery {
                        query,
                        max_posts: if all { None } else { Some(max) },
                        filter: window.filter(),
                        mode,
                    };
                    creator.posts(&query).await?
                }
                _ => {
                    if all {
                        bail!("--all needs --service and --creator");
                    }
                    let query = GlobalPostQuery {
                        query,
                        max_posts: max,
                        filter: window.filter(),
                        mode,
                    };
                    app.archive.get_posts(&query).await?
                }
            };
            for post in &posts {
                println!("{}  {}  {}", post.published, post.url(), post.title);
            }
            info!(count = posts.len(), "Listed posts");
        }
        Commands::Channels { server_id } => {
            let creator = require_creator(app, ServiceType::Discord, &server_id).await?;
            for channel in creator.channels().await?.iter() {
                println!("{}  {}", channel.id, channel.name);
            }
        }
        Commands::Messages {
            server_id,
            channel_id,
            max,
            window,
            concurrent,
        } => {
            let creator = require_creator(app, ServiceType::Discord, &server_id).await?;
            let channel = creator
                .get_channel(&channel_id)
                .await?
                .with_context(|| format!("channel {} not found on server {}", channel_id, server_id))?;
            let query = MessageQuery {
                max_messages: max,
                filter: window.filter(),
                mode: app.client.fetch_mode(concurrent),
            };
            for message in channel.messages(&query).await? {
                let author = message
                    .author
                    .as_ref()
                    .map(|author| author.display_name().to_string())
                    .unwrap_or_default();
                println!("{}  {}: {}", message.published, author, message.content);
            }
        }
        Commands::Hash { digest } => {
            let result = app.archive.get_file_hash(&digest).await?;
            match &result.file {
                Some(file) => println!("{}  {}", file, file.url()),
                None => println!("No file with digest {}", digest),
            }
            for post in &result.posts {
                println!("  post: {}  {}", post.url(), post.title);
            }
            for message in &result.messages {
                println!("  message: {}  {}", message.channel().url(), message.content);
            }
        }
        Commands::Version => {
            println!("{}", app.archive.get_app_version().await?);
        }
        Commands::Download {
            service,
            creator_id,
            post_id,
            dir,
            overwrite,
        } => {
            let creator = require_creator(app, service, &creator_id).await?;
            let post = creator
                .get_post(&post_id)
                .await?
                .with_context(|| format!("post {} not found", post_id))?;
            let dir = dir.unwrap_or_else(|| PathBuf::from(&app.settings.download.directory).join(&post.id));
            let overwrite = overwrite || app.settings.download.overwrite;

            let complete = app.downloader.save_post(&post, &dir, overwrite).await?;
            println!(
                "{} -> {} ({})",
                post.title,
                dir.display(),
                if complete { "complete" } else { "some files skipped" }
            );
        }
    }
    Ok(())
}

async fn require_creator(
    app: &Application,
    service: ServiceType,
    creator_id: &str,
) -> Result<std::sync::Arc<Creator>> {
    app.archive
        .get_creator(service, creator_id)
        .await?
        .with_context(|| format!("creator {}/{} not found", service, creator_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date_forms() {
        let day = parse_date("2024-03-01").unwrap();
        assert_eq!(day.to_string(), "2024-03-01 00:00:00");

        let instant = parse_date("2024-03-01T12:30:00").unwrap();
        assert_eq!(instant.to_string(), "2024-03-01 12:30:00");

        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_posts_creator_flags_go_together() {
        assert!(Cli::try_parse_from(["kemono", "posts", "--service", "fanbox"]).is_err());
        assert!(Cli::try_parse_from(["kemono", "posts", "--service", "fanbox", "--creator", "1"]).is_ok());
    }
}
