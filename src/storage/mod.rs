//! Storage module
//!
//! This module contains the storage side of the system:
//! - The `Source` seam the table engine loads data through
//! - The bounded FIFO cache
//! - File name sanitization
//! - The storage role service

pub mod cache;
pub mod sanitize;
pub mod service;

pub use cache::{FifoCache, DEFAULT_CACHE_CAPACITY};
pub use sanitize::sanitize;
pub use service::Storage;

use crate::error::Result;

/// Provider of raw delimited content by identifier.
///
/// An empty string means "not found or unreadable". `Err` is reserved for
/// transport failures, which abort the query.
pub trait Source {
    fn fetch(&mut self, id: &str) -> Result<String>;
}
