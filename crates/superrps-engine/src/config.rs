//! Rules configuration and the engine's lifecycle state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

/// Tunables for inventory regeneration.
///
/// When a player's remaining moves drop below `regen_threshold` after a
/// round, `regen_iterations` random move slots each gain
/// `regen_quantity_each`. With the defaults a player can never run dry,
/// so a session only ends when somebody quits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Regenerate when the inventory total is strictly below this.
    pub regen_threshold: u32,

    /// Moves added to the chosen slot per iteration.
    pub regen_quantity_each: u32,

    /// Number of random slots topped up per regeneration.
    pub regen_iterations: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            regen_threshold: 3,
            regen_quantity_each: 1,
            regen_iterations: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// EnginePhase
// ---------------------------------------------------------------------------

/// Where a peer's turn engine is in the session lifecycle.
///
/// ```text
/// AwaitingStageSelection → Playing → SessionEnded
///            └──────────(quit)──────────↗
/// ```
///
/// - **AwaitingStageSelection**: no stage yet. Player 1 leaves this phase
///   by picking one; Player 2 by receiving the first state.
/// - **Playing**: stage fixed, turns alternating.
/// - **SessionEnded**: someone quit. The engine accepts nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    AwaitingStageSelection,
    Playing,
    SessionEnded,
}

impl EnginePhase {
    /// Returns `true` while the engine still accepts turns.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::SessionEnded)
    }
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingStageSelection => write!(f, "AwaitingStageSelection"),
            Self::Playing => write!(f, "Playing"),
            Self::SessionEnded => write!(f, "SessionEnded"),
        }
    }
}

// ---------------------------------------------------------------------------
// EndGameCode
// ---------------------------------------------------------------------------

/// What the session driver should do after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndGameCode {
    /// Keep going: wait for the opponent's next message.
    Continue,
    /// The local player submitted the quit sentinel.
    LocalQuit,
    /// The opponent submitted the quit sentinel.
    OpponentQuit,
}

impl EndGameCode {
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}
