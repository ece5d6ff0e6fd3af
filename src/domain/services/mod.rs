//! Domain Services
//!
//! Pure logic applied to raw records before they become entities.

pub mod date_filter;

pub use date_filter::{included, DateFilter};
