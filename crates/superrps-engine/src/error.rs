//! Error types for the engine layer.

use superrps_protocol::{Move, PlayerSlot, ProtocolError};

use crate::EnginePhase;

/// Errors that can occur while driving a turn.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Framing, decoding, or the connection failed. Always fatal to the
    /// session.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The console handed back a move with no uses left.
    ///
    /// Consoles are expected to validate input with
    /// [`parse_play`](crate::parse_play) before returning it, so this
    /// points at a console bug rather than at the opponent.
    #[error("move {0} has no uses left")]
    MoveUnavailable(Move),

    /// The engine was asked to do something its phase doesn't allow,
    /// e.g. handle a message after the session ended.
    #[error("engine is {actual}, expected {expected}")]
    InvalidPhase {
        expected: EnginePhase,
        actual: EnginePhase,
    },

    /// Only Player 1 opens a session by picking the stage.
    #[error("{0} does not select the stage")]
    NotStageSelector(PlayerSlot),
}
