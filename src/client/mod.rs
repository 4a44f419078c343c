//! Query client
//!
//! Thin requester over a [`Connection`]: forwards one query line and returns
//! the server's CSV reply.

use tracing::debug;

use crate::error::Result;
use crate::net::Connection;

/// Client connected to a query server
#[derive(Debug)]
pub struct Client {
    conn: Connection,
}

impl Client {
    pub fn connect(addr: &str) -> Result<Self> {
        let conn = Connection::connect(addr)?;
        debug!(addr, "connected to query server");
        Ok(Self { conn })
    }

    /// Send `line` as a query and wait for the result
    pub fn work(&mut self, line: &str) -> Result<String> {
        self.conn.request(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::serve;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_forwards_line_verbatim() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        thread::spawn(move || serve(listener, |line| Ok(format!("got[{}]", line))));

        let mut client = Client::connect(&addr).unwrap();
        assert_eq!(client.work("from a.csv  take 1").unwrap(), "got[from a.csv  take 1]");
        assert_eq!(client.work("").unwrap(), "got[]");
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(Client::connect(&addr).is_err());
    }
}
