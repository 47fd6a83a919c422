//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. When you see a
//! `ProtocolError`, the problem is in framing or (de)serialization of
//! what the peer sent, not in the game rules.

use superrps_transport::TransportError;

/// Errors that can occur in the protocol layer.
///
/// Everything except [`Encode`](Self::Encode) describes bad input from
/// the other peer and is fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A frame's first byte was neither `0` nor `1`.
    #[error("invalid frame flag byte {0:#04x}")]
    InvalidFlag(u8),

    /// The reassembled message was not valid UTF-8 text.
    #[error("message is not valid UTF-8")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    /// Serialization failed (turning a Rust type into text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning text into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or an
    /// unknown stage or move symbol.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but breaks a protocol rule, e.g. a state that
    /// arrives without a stage or switches stage mid-session.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The underlying connection failed while sending or receiving frames.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
