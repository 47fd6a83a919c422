//! GELA372 message framing.
//!
//! GELA372 splits a logical message into fixed-size transport units so a
//! receiver can reassemble it without a length header:
//!
//! ```text
//! +------+---------------------------+
//! | flag | payload (<= unit - 1)     |
//! +------+---------------------------+
//!   '0'   more units follow
//!   '1'   this is the message's last unit
//! ```
//!
//! Every unit but the last is exactly `unit_size` bytes. The last unit
//! may be shorter, and exactly one unit per message carries `'1'`, even
//! for an empty message. There is no acknowledgement: ordering and
//! delivery come from the underlying stream.
//!
//! The protocol relies on the peers taking turns. A message is fully
//! received before a reply is sent, so the last unit of one message is
//! never followed on the wire by the start of the next before the
//! receiver has read it.

use superrps_transport::{Connection, TransportError};

use crate::ProtocolError;

/// Reference transport unit size in bytes, flag byte included.
pub const BUFFER_SIZE: usize = 1024;

/// Smallest usable unit: one flag byte plus one payload byte.
pub const MIN_UNIT_SIZE: usize = 2;

/// Flag byte of a unit that is followed by more units of the same message.
pub const LAST_PACKET_FALSE: u8 = b'0';

/// Flag byte of the final unit of a message.
pub const LAST_PACKET_TRUE: u8 = b'1';

/// One received transport unit, split into flag and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub is_last: bool,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Parses a raw unit. The first byte must be a valid flag.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidFlag`] for any other first byte.
    pub fn parse(unit: &[u8]) -> Result<Self, ProtocolError> {
        let (&flag, payload) = unit
            .split_first()
            .ok_or_else(|| ProtocolError::InvalidMessage("empty frame".into()))?;
        let is_last = parse_flag(flag)?;
        Ok(Self {
            is_last,
            payload: payload.to_vec(),
        })
    }
}

fn parse_flag(flag: u8) -> Result<bool, ProtocolError> {
    match flag {
        LAST_PACKET_FALSE => Ok(false),
        LAST_PACKET_TRUE => Ok(true),
        other => Err(ProtocolError::InvalidFlag(other)),
    }
}

fn closed() -> ProtocolError {
    ProtocolError::Transport(TransportError::ConnectionClosed(
        "peer closed the connection mid-session".into(),
    ))
}

/// Splits, sends, and reassembles GELA372 messages for one unit size.
///
/// Both peers must agree on the unit size. [`Framer::default`] uses
/// [`BUFFER_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    unit_size: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self {
            unit_size: BUFFER_SIZE,
        }
    }
}

impl Framer {
    /// Creates a framer for `unit_size`-byte units, raised to
    /// [`MIN_UNIT_SIZE`] if smaller.
    pub fn new(unit_size: usize) -> Self {
        Self {
            unit_size: unit_size.max(MIN_UNIT_SIZE),
        }
    }

    /// Size of one transport unit, flag byte included.
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Payload bytes carried by one full unit.
    pub fn payload_size(&self) -> usize {
        self.unit_size - 1
    }

    /// Splits `message` into framed units, ready to write in order.
    ///
    /// Always yields at least one unit; the final one carries
    /// [`LAST_PACKET_TRUE`].
    pub fn split(&self, message: &[u8]) -> Vec<Vec<u8>> {
        let mut chunks: Vec<&[u8]> =
            message.chunks(self.payload_size()).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }

        let last = chunks.len() - 1;
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let flag = if i == last {
                    LAST_PACKET_TRUE
                } else {
                    LAST_PACKET_FALSE
                };
                let mut unit = Vec::with_capacity(chunk.len() + 1);
                unit.push(flag);
                unit.extend_from_slice(chunk);
                unit
            })
            .collect()
    }

    /// Sends `message` to the peer as a sequence of framed units.
    pub async fn send_message<C: Connection>(
        &self,
        conn: &mut C,
        message: &str,
    ) -> Result<(), ProtocolError> {
        let units = self.split(message.as_bytes());
        tracing::trace!(
            conn_id = %conn.id(),
            bytes = message.len(),
            units = units.len(),
            "sending message"
        );
        for unit in &units {
            conn.send(unit).await?;
        }
        Ok(())
    }

    /// Receives exactly one unit and splits it into flag and payload.
    ///
    /// A unit flagged "not last" is always full-sized on the wire, so if
    /// the stream hands it over in pieces the remainder is read before
    /// returning. A unit flagged "last" is taken as one read delivered it.
    ///
    /// # Errors
    /// - [`ProtocolError::InvalidFlag`] if the first byte is not a flag.
    /// - [`ProtocolError::Transport`] if the peer closed the stream or
    ///   the read failed.
    pub async fn receive_next_frame<C: Connection>(
        &self,
        conn: &mut C,
    ) -> Result<Frame, ProtocolError> {
        let mut unit = conn.recv(self.unit_size).await?.ok_or_else(closed)?;

        let flag = unit.first().copied().ok_or_else(closed)?;
        let is_last = parse_flag(flag)?;

        if !is_last && unit.len() < self.unit_size {
            let rest = conn
                .recv_exact(self.unit_size - unit.len())
                .await?
                .ok_or_else(closed)?;
            unit.extend_from_slice(&rest);
        }

        tracing::trace!(
            conn_id = %conn.id(),
            is_last,
            payload_len = unit.len() - 1,
            "received frame"
        );
        Frame::parse(&unit)
    }

    /// Receives frames until one is flagged last, and returns the
    /// concatenated payload as text.
    ///
    /// # Errors
    /// Any error from [`receive_next_frame`](Self::receive_next_frame),
    /// or [`ProtocolError::InvalidUtf8`] if the reassembled bytes are not
    /// text. Payload bytes are joined before decoding, so multi-byte
    /// characters may straddle unit boundaries.
    pub async fn receive_message<C: Connection>(
        &self,
        conn: &mut C,
    ) -> Result<String, ProtocolError> {
        let mut message = Vec::new();
        loop {
            let frame = self.receive_next_frame(conn).await?;
            message.extend_from_slice(&frame.payload);
            if frame.is_last {
                break;
            }
        }
        String::from_utf8(message).map_err(ProtocolError::InvalidUtf8)
    }
}

/// Sends `message` using [`BUFFER_SIZE`] units.
pub async fn send_message<C: Connection>(
    conn: &mut C,
    message: &str,
) -> Result<(), ProtocolError> {
    Framer::default().send_message(conn, message).await
}

/// Receives one [`BUFFER_SIZE`] unit.
pub async fn receive_next_frame<C: Connection>(
    conn: &mut C,
) -> Result<Frame, ProtocolError> {
    Framer::default().receive_next_frame(conn).await
}

/// Receives one complete logical message using [`BUFFER_SIZE`] units.
pub async fn receive_message<C: Connection>(
    conn: &mut C,
) -> Result<String, ProtocolError> {
    Framer::default().receive_message(conn).await
}
