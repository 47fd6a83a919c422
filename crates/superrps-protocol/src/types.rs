//! Game-state types that travel on the wire.
//!
//! Every exchange between the two peers carries one complete
//! [`GameState`]. The receiver replaces its own copy with it wholesale,
//! so these types are the single source of truth for a session: whose
//! turn it is, which stage is being played, and each player's score,
//! remaining moves, and latest move.
//!
//! The serde attributes pin the JSON shape: moves are the one-letter
//! symbols `R`/`P`/`S`, the quit sentinel is `\q`, stages are their
//! upper-case names, and players are keyed `"1"` and `"2"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two-character sequence a player sends instead of a move (or a
/// stage name) to end the session.
pub const QUIT_MESSAGE: &str = "\\q";

/// A symbol that doesn't name any move, stage, or the quit sentinel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown symbol {0:?}")]
pub struct UnknownSymbol(pub String);

// ---------------------------------------------------------------------------
// PlayerSlot
// ---------------------------------------------------------------------------

/// Identity of one of the two peers.
///
/// Player 1 is the peer that dials out, picks the stage, and moves first.
/// Player 2 is the peer that accepted the connection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
)]
pub enum PlayerSlot {
    #[default]
    #[serde(rename = "1")]
    Player1,
    #[serde(rename = "2")]
    Player2,
}

impl PlayerSlot {
    /// Returns the opposing slot.
    pub fn other(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }

    /// Returns `1` or `2`.
    pub fn number(self) -> u8 {
        match self {
            Self::Player1 => 1,
            Self::Player2 => 2,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Move / Play
// ---------------------------------------------------------------------------

/// One of the three hand shapes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Move {
    #[serde(rename = "R")]
    Rock,
    #[serde(rename = "P")]
    Paper,
    #[serde(rename = "S")]
    Scissors,
}

impl Move {
    /// All moves, in inventory order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats.
    ///
    /// Each move beats exactly one other and loses to exactly one other,
    /// so two different moves never tie.
    pub fn beats(self) -> Move {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }

    /// The one-letter wire symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Rock => "R",
            Self::Paper => "P",
            Self::Scissors => "S",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Move {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::ALL
            .into_iter()
            .find(|m| m.symbol() == s)
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

/// What a player submits on their turn: a move, or the quit sentinel.
///
/// Serialized as a bare string (`"R"`, `"P"`, `"S"` or `"\q"`), which is
/// why this goes through `String` rather than deriving an enum encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Play {
    Move(Move),
    Quit,
}

impl Play {
    /// Returns the move, or `None` for the quit sentinel.
    pub fn as_move(self) -> Option<Move> {
        match self {
            Self::Move(m) => Some(m),
            Self::Quit => None,
        }
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Self::Quit)
    }
}

impl From<Move> for Play {
    fn from(m: Move) -> Self {
        Self::Move(m)
    }
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(m) => fmt::Display::fmt(m, f),
            Self::Quit => f.write_str(QUIT_MESSAGE),
        }
    }
}

impl FromStr for Play {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == QUIT_MESSAGE {
            return Ok(Self::Quit);
        }
        s.parse().map(Self::Move)
    }
}

impl From<Play> for String {
    fn from(play: Play) -> Self {
        play.to_string()
    }
}

impl TryFrom<String> for Play {
    type Error = UnknownSymbol;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Remaining count of each move for one player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Inventory {
    #[serde(rename = "R")]
    pub rock: u32,
    #[serde(rename = "P")]
    pub paper: u32,
    #[serde(rename = "S")]
    pub scissors: u32,
}

impl Inventory {
    pub const fn new(rock: u32, paper: u32, scissors: u32) -> Self {
        Self {
            rock,
            paper,
            scissors,
        }
    }

    /// How many of `m` are left.
    pub fn count(&self, m: Move) -> u32 {
        match m {
            Move::Rock => self.rock,
            Move::Paper => self.paper,
            Move::Scissors => self.scissors,
        }
    }

    fn slot_mut(&mut self, m: Move) -> &mut u32 {
        match m {
            Move::Rock => &mut self.rock,
            Move::Paper => &mut self.paper,
            Move::Scissors => &mut self.scissors,
        }
    }

    /// Uses up one `m`. Returns `false`, leaving the inventory untouched,
    /// if none are left.
    pub fn take(&mut self, m: Move) -> bool {
        let slot = self.slot_mut(m);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Adds `quantity` of `m`.
    pub fn add(&mut self, m: Move, quantity: u32) {
        let slot = self.slot_mut(m);
        *slot = slot.saturating_add(quantity);
    }

    /// Sum of all remaining moves, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.rock
            .saturating_add(self.paper)
            .saturating_add(self.scissors)
    }

    /// Sum of all remaining moves, or `None` if it doesn't fit in a `u32`.
    pub fn checked_total(&self) -> Option<u32> {
        self.rock
            .checked_add(self.paper)?
            .checked_add(self.scissors)
    }

    /// Moves with at least one use left, in inventory order.
    pub fn available(&self) -> Vec<Move> {
        Move::ALL
            .into_iter()
            .filter(|m| self.count(*m) > 0)
            .collect()
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R: {}, P: {}, S: {}",
            self.rock, self.paper, self.scissors
        )
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// A named preset that decides both players' starting inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Heaven,
    Office,
    Rainforest,
    Mountain,
    Asteroid,
    Armory,
}

impl Stage {
    /// Every stage, in menu order.
    pub const ALL: [Stage; 6] = [
        Stage::Heaven,
        Stage::Office,
        Stage::Rainforest,
        Stage::Mountain,
        Stage::Asteroid,
        Stage::Armory,
    ];

    /// The stage's name as typed by players and sent on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Heaven => "HEAVEN",
            Self::Office => "OFFICE",
            Self::Rainforest => "RAINFOREST",
            Self::Mountain => "MOUNTAIN",
            Self::Asteroid => "ASTEROID",
            Self::Armory => "ARMORY",
        }
    }

    /// The inventory each player starts with on this stage.
    pub fn starting_inventory(self) -> Inventory {
        match self {
            Self::Heaven => Inventory::new(3, 3, 3),
            Self::Office => Inventory::new(1, 2, 2),
            Self::Rainforest => Inventory::new(2, 3, 1),
            Self::Mountain => Inventory::new(2, 1, 1),
            Self::Asteroid => Inventory::new(3, 1, 2),
            Self::Armory => Inventory::new(2, 1, 3),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// RoundWinner
// ---------------------------------------------------------------------------

/// Result of the most recently completed round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum RoundWinner {
    #[serde(rename = "1")]
    Player1,
    #[serde(rename = "2")]
    Player2,
    #[serde(rename = "tie")]
    Tie,
    /// No round has completed yet.
    #[default]
    #[serde(rename = "unset")]
    Unset,
}

impl From<PlayerSlot> for RoundWinner {
    fn from(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::Player1 => Self::Player1,
            PlayerSlot::Player2 => Self::Player2,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerState / GameState
// ---------------------------------------------------------------------------

/// One player's slice of the game state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub score: u32,
    pub move_inventory: Inventory,
    /// Latest submission; `None` until the player's first turn.
    pub current_move: Option<Play>,
}

/// Both players' state, keyed by slot.
///
/// A struct with two named fields rather than a map: there is no such
/// thing as a third player or a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Players {
    #[serde(rename = "1")]
    pub player1: PlayerState,
    #[serde(rename = "2")]
    pub player2: PlayerState,
}

impl Players {
    pub fn get(&self, slot: PlayerSlot) -> &PlayerState {
        match slot {
            PlayerSlot::Player1 => &self.player1,
            PlayerSlot::Player2 => &self.player2,
        }
    }

    pub fn get_mut(&mut self, slot: PlayerSlot) -> &mut PlayerState {
        match slot {
            PlayerSlot::Player1 => &mut self.player1,
            PlayerSlot::Player2 => &mut self.player2,
        }
    }
}

/// The complete, authoritative state of one session.
///
/// Created once per session, sent whole on every turn boundary, and
/// replaced whole on receipt. There is no merging: the most recently
/// received state wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Whose move is currently being processed.
    pub turn_owner: PlayerSlot,
    /// `None` until Player 1 picks a stage.
    pub stage: Option<Stage>,
    pub round_winner: RoundWinner,
    pub players: Players,
}

impl GameState {
    /// A fresh state: Player 1's turn, no stage, zero scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stage and gives both players its starting inventory.
    pub fn install_stage(&mut self, stage: Stage) {
        self.stage = Some(stage);
        let inventory = stage.starting_inventory();
        self.players.player1.move_inventory = inventory;
        self.players.player2.move_inventory = inventory;
    }

    /// Hands the turn to the other player.
    pub fn change_turn(&mut self) {
        self.turn_owner = self.turn_owner.other();
    }

    pub fn player(&self, slot: PlayerSlot) -> &PlayerState {
        self.players.get(slot)
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerState {
        self.players.get_mut(slot)
    }

    /// The latest submission of `slot`, if any.
    pub fn current_move(&self, slot: PlayerSlot) -> Option<Play> {
        self.player(slot).current_move
    }

    /// Scores as `(mine, theirs)` from `local`'s point of view.
    pub fn scores_for(&self, local: PlayerSlot) -> (u32, u32) {
        (
            self.player(local).score,
            self.player(local.other()).score,
        )
    }
}
