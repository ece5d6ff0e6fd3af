//! Result of a lookup by file digest.

use std::sync::Arc;

use super::file::File;
use super::message::Message;
use super::post::Post;

/// A file plus the posts and Discord messages that reference it.
#[derive(Debug, Clone, Default)]
pub struct FileHashResult {
    pub file: Option<File>,
    pub posts: Vec<Arc<Post>>,
    pub messages: Vec<Message>,
}

impl FileHashResult {
    pub fn new(file: File, posts: Vec<Arc<Post>>, messages: Vec<Message>) -> Self {
        Self {
            file: Some(file),
            posts,
            messages,
        }
    }

    /// The result of a lookup that found nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.posts.is_empty() && self.messages.is_empty()
    }
}
