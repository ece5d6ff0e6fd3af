//! Client settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::value_objects::{Endpoints, MIRROR_PLACEHOLDER};

/// Root configuration structure containing all client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root URLs of the archive
    pub api: ApiSettings,

    /// HTTP client settings
    pub http: HttpSettings,

    /// Rate-limit retry policy
    pub retry: RetrySettings,

    /// Pagination and batching
    pub fetch: FetchSettings,

    /// File download behaviour
    pub download: DownloadSettings,

    /// Current environment (development, production)
    pub environment: String,
}

/// Root URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Web UI root (e.g., "https://kemono.su")
    pub site_url: String,

    /// JSON API root
    pub api_url: String,

    /// Data mirror template containing `{mirror}`
    pub data_url_template: String,

    /// Discord asset CDN
    pub discord_cdn_url: String,

    /// Mirror index used for file URLs
    pub default_mirror: u8,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Retry policy for rate-limited responses.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub backoff_factor_ms: u64,

    /// Growth factor between retries
    pub backoff_multiplier: f64,

    /// Upper bound on a single delay in milliseconds
    pub max_backoff_ms: u64,

    /// Status codes that trigger a retry
    pub retry_statuses: Vec<u16>,

    /// Prefer a numeric `Retry-After` header over the computed backoff
    pub respect_retry_after: bool,

    /// Randomise delays by +/-30%
    pub jitter: bool,
}

/// Pagination and batch fetching.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// Pages per concurrent window
    pub batch_window: usize,

    /// Requests in flight per window
    pub batch_concurrency: usize,

    /// Upper bound for the global post listing
    pub max_posts_limit: usize,
}

/// File download configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSettings {
    /// Default target directory
    pub directory: String,

    /// Replace files that already exist
    pub overwrite: bool,

    /// Check SHA-256 of content-addressed files after download
    pub verify_digest: bool,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // KEMONO__RETRY__MAX_RETRIES=5 -> retry.max_retries = 5
            .add_source(
                Environment::default()
                    .prefix("KEMONO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("retry.retry_statuses")
                    .try_parsing(true),
            )
            .set_override_option("api.site_url", std::env::var("KEMONO_SITE_URL").ok())?
            .set_override_option("api.api_url", std::env::var("KEMONO_API_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    /// Built-in defaults only; no files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("development")?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let endpoints = Endpoints::default();
        Config::builder()
            .set_default("environment", environment)?
            .set_default("api.site_url", endpoints.site)?
            .set_default("api.api_url", endpoints.api)?
            .set_default("api.data_url_template", endpoints.data_template)?
            .set_default("api.discord_cdn_url", endpoints.discord_cdn)?
            .set_default("api.default_mirror", endpoints.default_mirror as i64)?
            .set_default("http.timeout_secs", 60_i64)?
            .set_default(
                "http.user_agent",
                format!("kemono-client/{}", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("retry.max_retries", 10_i64)?
            .set_default("retry.backoff_factor_ms", 100_i64)?
            .set_default("retry.backoff_multiplier", 2.0)?
            .set_default("retry.max_backoff_ms", 120_000_i64)?
            .set_default("retry.retry_statuses", vec![429_i64])?
            .set_default("retry.respect_retry_after", true)?
            .set_default("retry.jitter", false)?
            .set_default("fetch.batch_window", 50_i64)?
            .set_default("fetch.batch_concurrency", 10_i64)?
            .set_default("fetch.max_posts_limit", 1000_i64)?
            .set_default("download.directory", ".")?
            .set_default("download.overwrite", false)?
            .set_default("download.verify_digest", true)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if !self.api.data_url_template.contains(MIRROR_PLACEHOLDER)
            && self.api.data_url_template.contains('{')
        {
            return Err(ConfigError::Message(format!(
                "api.data_url_template must use '{}' as its only placeholder",
                MIRROR_PLACEHOLDER
            )));
        }
        if self.fetch.batch_window == 0 || self.fetch.batch_concurrency == 0 {
            return Err(ConfigError::Message(
                "fetch.batch_window and fetch.batch_concurrency must be positive".into(),
            ));
        }
        if self.fetch.max_posts_limit == 0 {
            return Err(ConfigError::Message(
                "fetch.max_posts_limit must be positive".into(),
            ));
        }
        if self.retry.retry_statuses.is_empty() {
            return Err(ConfigError::Message(
                "retry.retry_statuses must name at least one status".into(),
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Message(format!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                self.retry.backoff_multiplier
            )));
        }
        Ok(self)
    }
}

impl ApiSettings {
    /// Resolved root URLs.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            site: self.site_url.trim_end_matches('/').to_string(),
            api: self.api_url.trim_end_matches('/').to_string(),
            data_template: self.data_url_template.trim_end_matches('/').to_string(),
            discord_cdn: self.discord_cdn_url.trim_end_matches('/').to_string(),
            default_mirror: self.default_mirror,
        }
    }
}
