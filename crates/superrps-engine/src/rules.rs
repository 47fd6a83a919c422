//! Round resolution and inventory regeneration.
//!
//! Everything here is a plain function over [`GameState`] so it can be
//! checked without a connection. Randomness is passed in, never pulled
//! from a global, so tests can seed it.

use rand::Rng;
use superrps_protocol::{GameState, Inventory, Move, PlayerSlot, RoundWinner};

use crate::RulesConfig;

/// Outcome of one round, seen from the local player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    pub local_move: Move,
    pub opponent_move: Move,
    pub winner: RoundWinner,
    /// Scores after the round was awarded.
    pub local_score: u32,
    pub opponent_score: u32,
}

/// Decides a round between Player 1's and Player 2's moves.
///
/// Identical moves tie. Otherwise exactly one move beats the other.
pub fn round_winner(player1: Move, player2: Move) -> RoundWinner {
    if player1.beats() == player2 {
        RoundWinner::Player1
    } else if player2.beats() == player1 {
        RoundWinner::Player2
    } else {
        RoundWinner::Tie
    }
}

/// Resolves the round formed by both players' current moves.
///
/// Records the winner in `state.round_winner` and awards them a point.
/// Returns `None`, leaving `state` untouched, unless both players have a
/// real move on record (the quit sentinel doesn't count).
pub fn resolve_round(
    state: &mut GameState,
    local: PlayerSlot,
) -> Option<RoundReport> {
    let local_move = state.current_move(local)?.as_move()?;
    let opponent_move = state.current_move(local.other())?.as_move()?;

    let winner = match local {
        PlayerSlot::Player1 => round_winner(local_move, opponent_move),
        PlayerSlot::Player2 => round_winner(opponent_move, local_move),
    };

    state.round_winner = winner;
    match winner {
        RoundWinner::Player1 => {
            let score = &mut state.players.player1.score;
            *score = score.saturating_add(1);
        }
        RoundWinner::Player2 => {
            let score = &mut state.players.player2.score;
            *score = score.saturating_add(1);
        }
        RoundWinner::Tie | RoundWinner::Unset => {}
    }

    let (local_score, opponent_score) = state.scores_for(local);
    Some(RoundReport {
        local_move,
        opponent_move,
        winner,
        local_score,
        opponent_score,
    })
}

/// Tops up an inventory that has run low.
///
/// If the total is below `rules.regen_threshold`, picks a random move
/// `rules.regen_iterations` times and adds `rules.regen_quantity_each`
/// to it. Returns whether anything was added.
pub fn regenerate<R: Rng + ?Sized>(
    inventory: &mut Inventory,
    rules: &RulesConfig,
    rng: &mut R,
) -> bool {
    if inventory.total() >= rules.regen_threshold {
        return false;
    }
    for _ in 0..rules.regen_iterations {
        let slot = Move::ALL[rng.random_range(0..Move::ALL.len())];
        inventory.add(slot, rules.regen_quantity_each);
    }
    true
}
