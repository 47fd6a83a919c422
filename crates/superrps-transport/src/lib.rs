//! Transport abstraction layer for Super LAN RPS.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! reliable, in-order byte streams. The game protocol sits on top of these
//! and never touches sockets directly.
//!
//! Two stream flavours are provided:
//!
//! - TCP ([`TcpTransport`], [`connect`]) for real peers on a LAN
//! - In-memory pipes ([`duplex_pair`]) for tests and local simulations
//!
//! A [`Connection`] deliberately exposes "read units" rather than a
//! buffered reader: one [`recv`](Connection::recv) call maps to one read
//! on the underlying stream, which is exactly what the framing layer
//! above expects.

#![allow(async_fn_in_trait)]

mod error;
mod stream;

pub use error::TransportError;
pub use stream::{connect, duplex_pair, StreamConnection, TcpTransport};

use std::fmt;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, TransportError>;
}

/// A single bidirectional connection to the other peer.
///
/// All methods take `&mut self`: a session owns its connection outright
/// and reads and writes in lockstep, so there is never more than one
/// operation in flight.
pub trait Connection: Send + 'static {
    /// Writes all of `data` to the peer.
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Performs one read of at most `max_len` bytes.
    ///
    /// Returns `Ok(None)` when the peer has cleanly closed the stream.
    async fn recv(
        &mut self,
        max_len: usize,
    ) -> Result<Option<Vec<u8>>, TransportError>;

    /// Reads exactly `len` bytes, waiting for as many reads as needed.
    ///
    /// Returns `Ok(None)` if the stream ends before `len` bytes arrive.
    async fn recv_exact(
        &mut self,
        len: usize,
    ) -> Result<Option<Vec<u8>>, TransportError>;

    /// Shuts down the write half of the connection.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_equality() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(1);
        let c = ConnectionId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
