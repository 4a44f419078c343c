//! Table engine module
//!
//! This module contains the in-memory relational engine:
//! - Cell values and rows
//! - The mutable table and its operations
//! - Hash and sort-merge equi-joins
//! - The delimited text codec

pub mod codec;
pub mod join;
pub mod table;
pub mod value;

pub use join::{hash_join, sort_merge_join, JoinStrategy};
pub use table::{Table, COUNT_COLUMN};
pub use value::{Cell, Row};
