//! Network module
//!
//! Length-prefixed framing and blocking request/reply connections shared by
//! the client, query server and storage roles.

pub mod connection;
pub mod frame;

pub use connection::{serve, Connection};
pub use frame::{read_frame, write_frame, MAX_FRAME_SIZE};
