//! Query execution module
//!
//! This module contains the executor that runs parsed commands.

pub mod executor;

pub use executor::Executor;
