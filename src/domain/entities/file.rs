//! Remote file entity.
//!
//! A file is a name plus a path relative to one of the URL roots. It is a
//! pointer to content, not the content itself; nothing is downloaded when it
//! is constructed.

use serde::Deserialize;

use crate::domain::value_objects::record::{self, Record};
use crate::domain::value_objects::{Endpoints, UrlRoot};
use crate::shared::error::ClientError;

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

/// A named remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    path: String,
    content_type: Option<String>,
    root: UrlRoot,
    url_root: String,
}

#[derive(Debug, Deserialize)]
struct FileRow {
    #[serde(default)]
    name: Option<String>,
    path: String,
}

impl File {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        content_type: Option<String>,
        root: UrlRoot,
        endpoints: &Endpoints,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type,
            root,
            url_root: endpoints.resolve(root),
        }
    }

    /// A file on the default data mirror.
    pub fn data(name: impl Into<String>, path: impl Into<String>, endpoints: &Endpoints) -> Self {
        Self::new(name, path, None, endpoints.default_data(), endpoints)
    }

    /// A file addressed by its SHA-256 digest: `/data/ab/cd/abcd....ext`.
    pub fn from_digest(
        name: impl Into<String>,
        digest: &str,
        extension: &str,
        content_type: Option<String>,
        endpoints: &Endpoints,
    ) -> Self {
        let path = format!("/data{}", digest_path(digest, extension));
        Self::new(name, path, content_type, endpoints.default_data(), endpoints)
    }

    /// Build a file from a `{name, path}` record found inside a post or message.
    ///
    /// Such paths are relative to the mirror's `/data` directory.
    pub fn from_record(record: Record, endpoints: &Endpoints) -> Result<Self, ClientError> {
        let row: FileRow = record::decode(record)?;
        let name = row
            .name
            .unwrap_or_else(|| row.path.rsplit('/').next().unwrap_or_default().to_string());
        Ok(Self::data(name, format!("/data{}", row.path), endpoints))
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared MIME type; `None` until known.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn root(&self) -> UrlRoot {
        self.root
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.url_root, self.path)
    }

    /// The SHA-256 digest embedded in the path, if the path is content-addressed.
    pub fn content_hash(&self) -> Option<&str> {
        let file_name = self.path.rsplit('/').next()?;
        let stem = file_name.split('.').next()?;
        (stem.len() == SHA256_HEX_LEN && stem.bytes().all(|b| b.is_ascii_hexdigit())).then_some(stem)
    }

    /// Get the file extension from the name.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn is_text(&self) -> bool {
        self.has_type_prefix("text/")
    }

    pub fn is_image(&self) -> bool {
        self.has_type_prefix("image/")
    }

    pub fn is_video(&self) -> bool {
        self.has_type_prefix("video/")
    }

    fn has_type_prefix(&self, prefix: &str) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.starts_with(prefix))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<File '{}' in '{}'>", self.name, self.path)
    }
}

/// `/ab/cd/abcd....ext` for a digest.
pub fn digest_path(digest: &str, extension: &str) -> String {
    let first = digest.get(0..2).unwrap_or_default();
    let second = digest.get(2..4).unwrap_or_default();
    format!("/{}/{}/{}{}", first, second, digest, extension)
}
