//! File downloads.
//!
//! Streams a [`File`]'s resolved URL to disk through the same retry policy as
//! API calls. Content-addressed files (path stem is a SHA-256 digest) are
//! verified while streaming; a mismatch removes the partial file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::config::{DownloadSettings, HttpSettings, RetrySettings};
use crate::domain::{File, Post};
use crate::infrastructure::http::{with_retry, RetryPolicy};
use crate::shared::error::ClientError;

/// Suffix of a file while it is being written.
const PARTIAL_SUFFIX: &str = ".part";

/// What a single save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    /// `false` when an existing file was kept
    pub written: bool,
    pub bytes: u64,
    /// Declared type of the file, or the one reported by the server
    pub content_type: Option<String>,
}

pub struct FileDownloader {
    client: Client,
    policy: RetryPolicy,
    verify_digest: bool,
}

impl FileDownloader {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            verify_digest: true,
        }
    }

    pub fn from_settings(
        http: &HttpSettings,
        retry: &RetrySettings,
        download: &DownloadSettings,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self::new(client, RetryPolicy::from_settings(retry)).with_verify_digest(download.verify_digest))
    }

    pub fn with_verify_digest(mut self, verify_digest: bool) -> Self {
        self.verify_digest = verify_digest;
        self
    }

    /// Where `file` lands for `target`: directories get the file's name appended.
    pub async fn target_path(file: &File, target: &Path) -> PathBuf {
        let is_dir = fs::metadata(target)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        let trailing_separator = target
            .to_str()
            .map(|s| s.ends_with(std::path::MAIN_SEPARATOR) || s.ends_with('/'))
            .unwrap_or(false);

        if is_dir || trailing_separator {
            target.join(file.name())
        } else {
            target.to_path_buf()
        }
    }

    /// Download `file` to `target`.
    ///
    /// Existing files are kept unless `overwrite` is set.
    #[instrument(skip(self, file), fields(file = %file.name()))]
    pub async fn save(&self, file: &File, target: &Path, overwrite: bool) -> Result<DownloadOutcome, ClientError> {
        let path = Self::target_path(file, target).await;

        if !overwrite && fs::try_exists(&path).await? {
            debug!(path = %path.display(), "File exists, skipping");
            return Ok(DownloadOutcome {
                path,
                written: false,
                bytes: 0,
                content_type: file.content_type().map(str::to_string),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let url = file.url();
        let mut response = with_retry(&self.policy, || {
            let request = self.client.get(&url);
            async move { request.send().await.map_err(ClientError::from) }
        })
        .await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: response.status(),
                path: url,
            });
        }

        let content_type = file.content_type().map(str::to_string).or_else(|| {
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        });

        let partial = partial_path(&path);
        let mut out = fs::File::create(&partial).await?;
        let mut hasher = Sha256::new();
        let mut bytes = 0u64;

        let streamed = async {
            while let Some(chunk) = response.chunk().await? {
                hasher.update(&chunk);
                out.write_all(&chunk).await?;
                bytes += chunk.len() as u64;
            }
            out.flush().await?;
            Ok::<(), ClientError>(())
        }
        .await;
        drop(out);

        if let Err(e) = streamed {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }

        if self.verify_digest {
            if let Some(expected) = file.content_hash() {
                let actual = format!("{:x}", hasher.finalize());
                if !actual.eq_ignore_ascii_case(expected) {
                    warn!(expected, actual = %actual, "Digest mismatch, removing download");
                    fs::remove_file(&partial).await?;
                    return Err(ClientError::DigestMismatch {
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
        }

        fs::rename(&partial, &path).await?;
        info!(path = %path.display(), bytes, "Saved file");

        Ok(DownloadOutcome {
            path,
            written: true,
            bytes,
            content_type,
        })
    }

    /// Save every file of a post (preview first) under `dir`.
    ///
    /// Returns whether all of them were written; a post without files yields `false`.
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    pub async fn save_post(&self, post: &Post, dir: &Path, overwrite: bool) -> Result<bool, ClientError> {
        let files = post.all_files();
        if files.is_empty() {
            info!(title = %post.title, "Post has no files");
            return Ok(false);
        }

        fs::create_dir_all(dir).await?;

        let mut all_written = true;
        for file in files {
            let outcome = self.save(file, dir, overwrite).await?;
            all_written &= outcome.written;
        }
        Ok(all_written)
    }
}

impl std::fmt::Debug for FileDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownloader")
            .field("policy", &self.policy)
            .field("verify_digest", &self.verify_digest)
            .finish_non_exhaustive()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
