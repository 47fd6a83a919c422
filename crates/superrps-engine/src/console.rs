//! The player-facing side of the engine.
//!
//! The engine never reads a terminal or prints anything itself. It asks a
//! [`Console`] for the stage and for each move, and tells it what
//! happened through [`GameEvent`]s. The demo binary implements `Console`
//! on stdin/stdout; tests use [`ScriptedConsole`].

use std::collections::VecDeque;

use superrps_protocol::{Inventory, Play, Stage, QUIT_MESSAGE};

use crate::rules::RoundReport;
use crate::EndGameCode;

// ---------------------------------------------------------------------------
// Choices and events
// ---------------------------------------------------------------------------

/// Player 1's answer to the stage prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageChoice {
    Stage(Stage),
    /// The quit sentinel, typed instead of a stage name.
    Quit,
}

/// Something the player should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The stage is fixed and both players hold `starting`.
    StageAnnounced { stage: Stage, starting: Inventory },

    /// A round finished.
    RoundResolved(RoundReport),

    /// The local inventory ran low and was topped up.
    Regenerated { inventory: Inventory },

    /// The local player is about to block on the opponent's next message.
    WaitingForOpponent,

    /// The session is over.
    GameOver {
        code: EndGameCode,
        local_score: u32,
        opponent_score: u32,
    },

    /// The opponent sent something unusable or dropped the connection.
    OpponentError { reason: String },
}

/// Input and output for one player.
pub trait Console {
    /// Asks Player 1 which stage to play.
    async fn choose_stage(&mut self) -> StageChoice;

    /// Asks for the next move. The answer must be [`Play::Quit`] or a
    /// move with at least one use left in `inventory`.
    async fn choose_play(&mut self, inventory: &Inventory) -> Play;

    fn notify(&mut self, event: GameEvent);
}

impl<K: Console> Console for &mut K {
    async fn choose_stage(&mut self) -> StageChoice {
        (**self).choose_stage().await
    }

    async fn choose_play(&mut self, inventory: &Inventory) -> Play {
        (**self).choose_play(inventory).await
    }

    fn notify(&mut self, event: GameEvent) {
        (**self).notify(event);
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Typed input that isn't one of the currently valid options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{input:?} is not one of: {}", .valid.join(", "))]
pub struct InvalidSelection {
    pub input: String,
    /// What the player may type instead.
    pub valid: Vec<String>,
}

/// Plays accepted right now: every move still in stock, then quit.
pub fn valid_plays(inventory: &Inventory) -> Vec<Play> {
    inventory
        .available()
        .into_iter()
        .map(Play::Move)
        .chain(std::iter::once(Play::Quit))
        .collect()
}

/// Parses a typed move against the current inventory.
///
/// Matching is exact and case-sensitive: `R`, `P`, `S`, or `\q`. A move
/// with no uses left is rejected like any other unknown input.
pub fn parse_play(
    input: &str,
    inventory: &Inventory,
) -> Result<Play, InvalidSelection> {
    let valid = valid_plays(inventory);
    match input.parse::<Play>() {
        Ok(play) if valid.contains(&play) => Ok(play),
        _ => Err(InvalidSelection {
            input: input.to_string(),
            valid: valid.iter().map(ToString::to_string).collect(),
        }),
    }
}

/// Parses a typed stage name, or the quit sentinel.
pub fn parse_stage(input: &str) -> Result<StageChoice, InvalidSelection> {
    if input == QUIT_MESSAGE {
        return Ok(StageChoice::Quit);
    }
    input.parse().map(StageChoice::Stage).map_err(|_| InvalidSelection {
        input: input.to_string(),
        valid: Stage::ALL
            .iter()
            .map(|s| s.name().to_string())
            .chain(std::iter::once(QUIT_MESSAGE.to_string()))
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// ScriptedConsole
// ---------------------------------------------------------------------------

/// A console that replays canned answers and records every event.
///
/// Once the scripted plays run out it answers [`Play::Quit`], so a test
/// session always terminates. With no stage set it answers
/// [`StageChoice::Quit`].
///
/// ```
/// use superrps_engine::ScriptedConsole;
/// use superrps_protocol::{Move, Stage};
///
/// let console = ScriptedConsole::new()
///     .with_stage(Stage::Office)
///     .with_plays([Move::Rock.into(), Move::Paper.into()]);
/// assert!(console.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    stage: Option<Stage>,
    plays: VecDeque<Play>,
    events: Vec<GameEvent>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the stage prompt with `stage`.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Queue plays to answer move prompts with, in order.
    pub fn with_plays(mut self, plays: impl IntoIterator<Item = Play>) -> Self {
        self.plays.extend(plays);
        self
    }

    /// Every event received so far, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Plays not yet handed out.
    pub fn remaining_plays(&self) -> usize {
        self.plays.len()
    }
}

impl Console for ScriptedConsole {
    async fn choose_stage(&mut self) -> StageChoice {
        self.stage.map_or(StageChoice::Quit, StageChoice::Stage)
    }

    async fn choose_play(&mut self, _inventory: &Inventory) -> Play {
        self.plays.pop_front().unwrap_or(Play::Quit)
    }

    fn notify(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
