//! Request/reply connections
//!
//! A requester sends one frame and blocks until the reply frame arrives. The
//! responder side accepts any number of connections but handles one request
//! at a time, so every role stays a single sequential actor.

use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, info, warn};

use super::frame::{read_frame, write_frame};
use crate::error::{Error, Result};

/// A blocking request/reply connection to a named endpoint
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: String,
}

impl Connection {
    /// Connect to `addr`
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an accepted stream
    pub fn from_stream(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self { stream, peer }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn send(&mut self, message: &str) -> Result<()> {
        write_frame(&mut self.stream, message)
    }

    /// Block until the next message arrives
    pub fn receive(&mut self) -> Result<String> {
        read_frame(&mut self.stream)?.ok_or(Error::ConnectionClosed)
    }

    /// Send `message` and wait for the reply
    pub fn request(&mut self, message: &str) -> Result<String> {
        self.send(message)?;
        self.receive()
    }
}

/// A request waiting for the handler, with the channel its reply goes back on
struct Request {
    body: String,
    reply: Sender<String>,
}

/// Answer requests on `listener` until the handler fails.
///
/// Every accepted connection gets a reader thread, and all of them feed one
/// queue. The handler drains that queue on the calling thread, so requests
/// from any number of open clients are answered one at a time. A peer that
/// disconnects or breaks its stream only ends its own connection; a handler
/// error stops the loop and is returned.
pub fn serve<F>(listener: TcpListener, mut handler: F) -> Result<()>
where
    F: FnMut(&str) -> Result<String>,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    let (queue, requests) = mpsc::channel();
    thread::spawn(move || accept_loop(listener, queue));

    for request in requests {
        let reply = handler(&request.body)?;
        // The peer may already be gone
        let _ = request.reply.send(reply);
    }

    Ok(())
}

fn accept_loop(listener: TcpListener, queue: Sender<Request>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let conn = Connection::from_stream(stream);
                let queue = queue.clone();
                thread::spawn(move || handle_connection(conn, queue));
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }
}

fn handle_connection(mut conn: Connection, queue: Sender<Request>) {
    info!(peer = conn.peer(), "peer connected");

    loop {
        let body = match read_frame(&mut conn.stream) {
            Ok(Some(body)) => body,
            Ok(None) => {
                info!(peer = conn.peer(), "peer disconnected");
                return;
            }
            Err(e) => {
                warn!(peer = conn.peer(), error = %e, "dropping connection");
                return;
            }
        };

        let (reply, replies) = mpsc::channel();
        if queue.send(Request { body, reply }).is_err() {
            return;
        }
        let Ok(reply) = replies.recv() else {
            debug!(peer = conn.peer(), "server stopped before replying");
            return;
        };

        if let Err(e) = conn.send(&reply) {
            warn!(peer = conn.peer(), error = %e, "failed to send reply");
            return;
        }
    }
}
