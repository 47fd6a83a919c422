//! Turn engine and round rules for Super LAN RPS.
//!
//! Each peer runs one [`TurnEngine`]. The engine takes the opponent's
//! latest message, applies it to the session's [`GameState`], scores the
//! round if it is the [`ROUND_SCORER`], asks the local player for a move
//! through a [`Console`], and sends the result back.
//!
//! # Key types
//!
//! - [`TurnEngine`]: one peer's state machine
//! - [`EnginePhase`]: awaiting stage, playing, or ended
//! - [`EndGameCode`]: what the driver should do after a turn
//! - [`RulesConfig`]: regeneration tunables
//! - [`Console`]: where moves come from and events go
//! - [`ScriptedConsole`]: a canned console for tests and demos
//!
//! [`GameState`]: superrps_protocol::GameState

#![allow(async_fn_in_trait)]

mod config;
mod console;
mod engine;
mod error;
pub mod rules;

pub use config::{EndGameCode, EnginePhase, RulesConfig};
pub use console::{
    parse_play, parse_stage, valid_plays, Console, GameEvent, InvalidSelection,
    ScriptedConsole, StageChoice,
};
pub use engine::{TurnEngine, ROUND_SCORER};
pub use error::EngineError;
pub use rules::{regenerate, resolve_round, round_winner, RoundReport};
