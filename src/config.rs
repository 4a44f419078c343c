//! Process settings
//!
//! All three roles read the same settings file so the client, the query
//! server and the storage role agree on addresses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_CACHE_CAPACITY;
use crate::table::JoinStrategy;

/// Default settings file, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Default query server address
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:5555";

/// Default storage role address
pub const DEFAULT_STORAGE_ADDR: &str = "127.0.0.1:5556";

/// Shared settings for client, server and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Address the query server listens on
    #[serde(default = "default_server_addr")]
    pub server_addr: String,

    /// Address the storage role listens on
    #[serde(default = "default_storage_addr")]
    pub storage_addr: String,

    /// Root directory of the backing store
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Number of files the storage role keeps cached
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Algorithm behind the `join` command
    #[serde(default)]
    pub join_strategy: JoinStrategy,
}

fn default_server_addr() -> String {
    DEFAULT_SERVER_ADDR.to_string()
}

fn default_storage_addr() -> String {
    DEFAULT_STORAGE_ADDR.to_string()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            storage_addr: default_storage_addr(),
            data_path: default_data_path(),
            cache_capacity: default_cache_capacity(),
            join_strategy: JoinStrategy::default(),
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load settings from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse settings from a JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.server_addr.trim().is_empty() {
            return Err(Error::Config("server_addr must not be empty".to_string()));
        }
        if self.storage_addr.trim().is_empty() {
            return Err(Error::Config("storage_addr must not be empty".to_string()));
        }
        Ok(())
    }

    /// Set the query server address
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.server_addr = addr.into();
        self
    }

    /// Set the storage role address
    pub fn storage_addr(mut self, addr: impl Into<String>) -> Self {
        self.storage_addr = addr.into();
        self
    }

    /// Set the backing store root
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Set the cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the join algorithm
    pub fn join_strategy(mut self, strategy: JoinStrategy) -> Self {
        self.join_strategy = strategy;
        self
    }
}
