//! Query server
//!
//! Accepts raw query strings from clients, executes them against tables
//! loaded through a [`Source`] and replies with the result as CSV text.

use std::net::TcpListener;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::net::{self, Connection};
use crate::query::parse;
use crate::storage::Source;
use crate::table::JoinStrategy;

/// Server answering one query per request
#[derive(Debug)]
pub struct QueryServer<S: Source> {
    source: S,
    join_strategy: JoinStrategy,
}

impl<S: Source> QueryServer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            join_strategy: JoinStrategy::default(),
        }
    }

    /// Set the algorithm used by `join`
    pub fn join_strategy(mut self, strategy: JoinStrategy) -> Self {
        self.join_strategy = strategy;
        self
    }

    /// Execute a raw query and encode the resulting table
    pub fn work(&mut self, raw: &str) -> Result<String> {
        let commands = parse(raw);
        if commands.is_empty() && !raw.trim().is_empty() {
            debug!(query = raw, "query rejected");
        }

        let table = Executor::new(&mut self.source)
            .join_strategy(self.join_strategy)
            .run(&commands)?;
        table.to_csv()
    }

    /// Serve clients on `listener` until the source fails
    pub fn run(&mut self, listener: TcpListener) -> Result<()> {
        info!(join_strategy = %self.join_strategy, "query server ready");
        net::serve(listener, |raw| self.work(raw))
    }
}

/// [`Source`] backed by a remote storage role.
///
/// Connects on first use and drops the connection after a transport error so
/// the next fetch reconnects.
#[derive(Debug)]
pub struct RemoteSource {
    addr: String,
    conn: Option<Connection>,
}

impl RemoteSource {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            conn: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.storage_addr.clone())
    }

    fn connection(&mut self) -> Result<&mut Connection> {
        if self.conn.is_none() {
            info!(addr = %self.addr, "connecting to storage");
            self.conn = Some(Connection::connect(&self.addr)?);
        }
        self.conn.as_mut().ok_or(Error::ConnectionClosed)
    }
}

impl Source for RemoteSource {
    fn fetch(&mut self, id: &str) -> Result<String> {
        let result = self.connection().and_then(|conn| conn.request(id));
        if let Err(e) = &result {
            warn!(addr = %self.addr, error = %e, "storage request failed");
            self.conn = None;
        }
        result
    }
}
