//! # Super LAN RPS
//!
//! Two-player rock-paper-scissors over a LAN, with stage-dependent move
//! inventories, spoken over the GELA372 framing protocol.
//!
//! One peer hosts and plays as Player 2; the other joins, picks the stage,
//! and moves first as Player 1. Each turn carries the whole game state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use superrps::prelude::*;
//!
//! # async fn run() -> Result<(), SuperRpsError> {
//! let config = SessionConfig::builder().server("192.168.1.20:8011").build();
//! let console = ScriptedConsole::new()
//!     .with_stage(Stage::Office)
//!     .with_plays([Move::Rock.into(), Play::Quit]);
//! let report = join(&config, console).await?;
//! println!("{} - {}", report.local_score, report.opponent_score);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod session;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::SuperRpsError;
pub use session::{host, join, serve_one, Session, SessionOutcome, SessionReport};

pub use superrps_engine as engine;
pub use superrps_protocol as protocol;
pub use superrps_transport as transport;

/// Everything needed to host, join, or script a game.
pub mod prelude {
    pub use crate::{
        host, join, serve_one, Session, SessionConfig, SessionOutcome,
        SessionReport, SuperRpsError,
    };
    pub use superrps_engine::{
        parse_play, parse_stage, valid_plays, Console, EndGameCode, GameEvent,
        InvalidSelection, RoundReport, RulesConfig, ScriptedConsole,
        StageChoice,
    };
    pub use superrps_protocol::{
        Inventory, Move, Play, PlayerSlot, RoundWinner, Stage,
    };
}
