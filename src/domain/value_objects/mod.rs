//! Value Objects
//!
//! Immutable value types shared by entities and the fetch engine.

pub mod record;
mod service;
mod timestamp;
mod url_root;

pub use record::Record;
pub use service::ServiceType;
pub use timestamp::TimestampFormat;
pub use url_root::{Endpoints, UrlRoot, MIRROR_PLACEHOLDER};
