//! # Domain Layer
//!
//! The entity graph of the archive and the pure logic applied to raw records.
//!
//! ## Structure
//!
//! - **entities**: Creator, Post, Channel, Message, File and friends
//! - **value_objects**: Service identifiers, URL roots, timestamp formats, raw records
//! - **services**: Client-side date filtering
//! - **lazy**: Fetch-once fields used by the entities

pub mod entities;
pub mod lazy;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
