//! Stream-backed transport: TCP for real peers, duplex pipes for tests.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::net::{TcpListener, TcpStream};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// A TCP [`Transport`] that listens for incoming peers.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = StreamConnection<TcpStream>;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = StreamConnection::new(stream);
        tracing::info!(conn_id = %conn.id(), %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// Opens a TCP connection to a listening peer.
pub async fn connect(
    addr: &str,
) -> Result<StreamConnection<TcpStream>, TransportError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(TransportError::ConnectFailed)?;
    let conn = StreamConnection::new(stream);
    tracing::info!(conn_id = %conn.id(), addr, "connected to peer");
    Ok(conn)
}

/// Creates two connected in-memory connections.
///
/// Bytes written to one end are read from the other, with the same
/// in-order, reliable semantics as TCP. `max_buf` bounds how many unread
/// bytes each direction may hold before writers wait.
pub fn duplex_pair(
    max_buf: usize,
) -> (StreamConnection<DuplexStream>, StreamConnection<DuplexStream>) {
    let (a, b) = tokio::io::duplex(max_buf);
    (StreamConnection::new(a), StreamConnection::new(b))
}

/// A [`Connection`] over any async byte stream.
pub struct StreamConnection<S> {
    id: ConnectionId,
    stream: S,
}

impl<S> StreamConnection<S> {
    /// Wraps a stream, assigning it a fresh connection ID.
    pub fn new(stream: S) -> Self {
        Self {
            id: next_id(),
            stream,
        }
    }
}

impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        self.stream.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(
        &mut self,
        max_len: usize,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = vec![0u8; max_len];
        let n = self
            .stream
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 && max_len > 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn recv_exact(
        &mut self,
        len: usize,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = vec![0u8; len];
        match self.stream.read_exact(&mut buf).await {
            Ok(_) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(TransportError::ReceiveFailed(e)),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
