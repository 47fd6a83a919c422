//! Unified error type for Super LAN RPS.

use superrps_engine::EngineError;
use superrps_protocol::ProtocolError;
use superrps_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SuperRpsError {
    /// Binding, dialing, or the connection itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message could not be framed, encoded, or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The turn engine refused to go on.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SuperRpsError {
    /// Returns `true` if the error came from the other peer or the wire
    /// between us: a bad flag, an undecodable state, or a dropped
    /// connection.
    ///
    /// These end the session as an "opponent error". Everything else
    /// (failing to bind or dial, encoding our own state, a console
    /// returning an unavailable move) is a local fault.
    pub fn is_opponent_error(&self) -> bool {
        match self {
            Self::Transport(e) => transport_is_peer(e),
            Self::Protocol(e) | Self::Engine(EngineError::Protocol(e)) => {
                protocol_is_peer(e)
            }
            Self::Engine(_) => false,
        }
    }
}

fn transport_is_peer(e: &TransportError) -> bool {
    matches!(
        e,
        TransportError::ConnectionClosed(_)
            | TransportError::SendFailed(_)
            | TransportError::ReceiveFailed(_)
    )
}

fn protocol_is_peer(e: &ProtocolError) -> bool {
    match e {
        ProtocolError::Encode(_) => false,
        ProtocolError::Transport(t) => transport_is_peer(t),
        _ => true,
    }
}
