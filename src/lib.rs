//! csvdb - a distributed query engine over CSV files
//!
//! This library provides the components of a three-role system:
//! - Query language (tokenizer and command parser)
//! - Table engine (CSV codec, projection, ordering, counting, joins)
//! - Storage role (sanitized file access with a FIFO cache)
//! - Request/reply transport and the query server and client roles

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod net;
pub mod query;
pub mod server;
pub mod storage;
pub mod table;

pub use error::{Error, Result};
