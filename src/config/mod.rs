//! # Configuration Module
//!
//! This module handles client configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with KEMONO__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kemono_client::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("API root: {}", settings.api.api_url);
//! ```

mod settings;

pub use settings::*;
