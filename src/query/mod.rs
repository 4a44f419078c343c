//! Query language module
//!
//! This module contains the query command types and the line parser.

pub mod command;
pub mod parser;

pub use command::{Command, Keyword};
pub use parser::{parse, Parser};
