//! URL roots.
//!
//! Every request and every file URL is `{root}{path}`. The data root is a
//! template parameterised by a numbered mirror (`https://c{mirror}.kemono.su`).

use std::fmt;

/// Placeholder substituted with the mirror index in the data root template.
pub const MIRROR_PLACEHOLDER: &str = "{mirror}";

/// Kind of root endpoint a path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlRoot {
    /// Web UI root
    Site,
    /// Data mirror root
    Data { mirror: u8 },
    /// JSON API root
    Api,
    /// Discord asset CDN
    DiscordCdn,
}

impl fmt::Display for UrlRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site => write!(f, "site"),
            Self::Data { mirror } => write!(f, "data(c{})", mirror),
            Self::Api => write!(f, "api"),
            Self::DiscordCdn => write!(f, "discord-cdn"),
        }
    }
}

/// Concrete root URLs for each [`UrlRoot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub site: String,
    pub api: String,
    pub data_template: String,
    pub discord_cdn: String,
    pub default_mirror: u8,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            site: "https://kemono.su".into(),
            api: "https://kemono.su/api/v1".into(),
            data_template: "https://c{mirror}.kemono.su".into(),
            discord_cdn: "https://cdn.discordapp.com".into(),
            default_mirror: 3,
        }
    }
}

impl Endpoints {
    /// Point every root at a single base URL (useful against a local mock).
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            site: base.to_string(),
            api: format!("{}/api/v1", base),
            data_template: base.to_string(),
            discord_cdn: base.to_string(),
            default_mirror: 1,
        }
    }

    /// Resolve a root kind to its base URL without trailing slash.
    pub fn resolve(&self, root: UrlRoot) -> String {
        let base = match root {
            UrlRoot::Site => self.site.clone(),
            UrlRoot::Api => self.api.clone(),
            UrlRoot::DiscordCdn => self.discord_cdn.clone(),
            UrlRoot::Data { mirror } => self
                .data_template
                .replace(MIRROR_PLACEHOLDER, &mirror.to_string()),
        };
        base.trim_end_matches('/').to_string()
    }

    /// Join a root with an absolute path.
    pub fn url(&self, root: UrlRoot, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.resolve(root), path)
        } else {
            format!("{}/{}", self.resolve(root), path)
        }
    }

    /// The data root on the configured default mirror.
    pub fn default_data(&self) -> UrlRoot {
        UrlRoot::Data {
            mirror: self.default_mirror,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_root_substitutes_mirror() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.resolve(UrlRoot::Data { mirror: 3 }),
            "https://c3.kemono.su"
        );
        assert_eq!(
            endpoints.url(endpoints.default_data(), "/data/ab/cd/file.png"),
            "https://c3.kemono.su/data/ab/cd/file.png"
        );
    }

    #[test]
    fn test_api_url() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.url(UrlRoot::Api, "/fanbox/user/1/profile"),
            "https://kemono.su/api/v1/fanbox/user/1/profile"
        );
    }

    #[test]
    fn test_single_base_strips_trailing_slash() {
        let endpoints = Endpoints::single("http://127.0.0.1:9000/");
        assert_eq!(endpoints.url(UrlRoot::Api, "/posts"), "http://127.0.0.1:9000/api/v1/posts");
        assert_eq!(endpoints.url(UrlRoot::DiscordCdn, "avatars/1/a.png"), "http://127.0.0.1:9000/avatars/1/a.png");
    }
}
