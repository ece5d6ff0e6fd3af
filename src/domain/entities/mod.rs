//! # Domain Entities
//!
//! Typed views over the archive's raw records. Every entity has a pure
//! `from_record` factory that takes one record plus the already-built parent it
//! belongs to; factories never perform I/O.
//!
//! ## Graph
//!
//! - **Creator**: owns posts (fetched on demand) and lazily loaded
//!   announcements, fancards (Fanbox) and channels (Discord)
//! - **Post**: lazily loaded comments, reimport flag and revisions
//! - **Channel**: walks its messages on demand
//! - **Message**: belongs to one channel
//!
//! Children hold a back-reference to their parent. Memoized children use
//! `Weak` references so a parent and its caches never keep each other alive.

mod announcement;
mod channel;
mod comment;
mod creator;
mod fancard;
mod file;
mod file_hash;
mod message;
mod post;

pub use announcement::Announcement;
pub use channel::{Channel, MessageQuery};
pub use comment::{Comment, CommentRevision};
pub use creator::{Creator, PostQuery};
pub use fancard::Fancard;
pub use file::{digest_path, File};
pub use file_hash::FileHashResult;
pub use message::{DiscordUser, Message};
pub use post::{Post, PostRevision};
