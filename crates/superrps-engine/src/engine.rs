//! The per-peer turn engine.
//!
//! A [`TurnEngine`] owns nothing but its own phase, rules, and RNG. The
//! [`GameState`] belongs to the session driver and is lent to the engine
//! for each call, so the driver decides when a turn happens and the engine
//! decides what a turn does.
//!
//! # One round, end to end
//!
//! ```text
//! Player 1                              Player 2
//! open: pick stage, pick move ──state──▶ handle_message: adopt stage,
//!                                        pick move
//!                              ◀──state── (mirror the round for display)
//! handle_message: score round,
//! regenerate, pick move       ──state──▶ handle_message: ...
//! ```
//!
//! Player 1 is the [`ROUND_SCORER`]: the score and regeneration in the
//! state it sends are the ones that count. Player 2 resolves each round
//! on its own copy only so its player sees the result straight away; that
//! copy is replaced by Player 1's on the next receipt.

use rand::Rng;
use superrps_protocol::{
    Codec, Framer, GameState, JsonCodec, Play, PlayerSlot, ProtocolError,
    WireMessage,
};
use superrps_transport::Connection;

use crate::console::{Console, GameEvent, StageChoice};
use crate::rules::{regenerate, resolve_round};
use crate::{EndGameCode, EngineError, EnginePhase, RulesConfig};

/// The player whose resolution of each round is authoritative.
pub const ROUND_SCORER: PlayerSlot = PlayerSlot::Player1;

/// Drives one peer's side of a session.
///
/// `R` supplies randomness for regeneration; `D` turns states into text.
pub struct TurnEngine<R, D = JsonCodec> {
    local: PlayerSlot,
    phase: EnginePhase,
    rules: RulesConfig,
    framer: Framer,
    codec: D,
    rng: R,
}

impl<R: Rng> TurnEngine<R> {
    /// Creates an engine for `local` using JSON and the reference unit
    /// size.
    pub fn new(local: PlayerSlot, rules: RulesConfig, rng: R) -> Self {
        Self {
            local,
            phase: EnginePhase::AwaitingStageSelection,
            rules,
            framer: Framer::default(),
            codec: JsonCodec,
            rng,
        }
    }
}

impl<R: Rng, D: Codec> TurnEngine<R, D> {
    pub fn with_framer(mut self, framer: Framer) -> Self {
        self.framer = framer;
        self
    }

    pub fn local(&self) -> PlayerSlot {
        self.local
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn framer(&self) -> Framer {
        self.framer
    }

    pub fn is_round_scorer(&self) -> bool {
        self.local == ROUND_SCORER
    }

    /// Opens the session: Player 1 picks a stage and makes the first move.
    ///
    /// `state` is reset and the stage installed before the move is
    /// chosen. If the player quits at the stage prompt, a bare quit
    /// message is sent instead of a state.
    ///
    /// # Errors
    /// [`EngineError::NotStageSelector`] when called on Player 2's engine,
    /// [`EngineError::InvalidPhase`] when a stage was already chosen, or
    /// any error from sending.
    pub async fn open<C, K>(
        &mut self,
        state: &mut GameState,
        conn: &mut C,
        console: &mut K,
    ) -> Result<EndGameCode, EngineError>
    where
        C: Connection,
        K: Console,
    {
        if self.local != ROUND_SCORER {
            return Err(EngineError::NotStageSelector(self.local));
        }
        self.expect_phase(EnginePhase::AwaitingStageSelection)?;

        let stage = match console.choose_stage().await {
            StageChoice::Stage(stage) => stage,
            StageChoice::Quit => {
                tracing::info!(player = %self.local, "quit at stage selection");
                let text = WireMessage::Quit.encode(&self.codec)?;
                self.framer.send_message(conn, &text).await?;
                self.phase = EnginePhase::SessionEnded;
                return Ok(EndGameCode::LocalQuit);
            }
        };

        *state = GameState::new();
        state.install_stage(stage);
        self.phase = EnginePhase::Playing;
        tracing::info!(player = %self.local, stage = ?stage, "stage selected");
        console.notify(GameEvent::StageAnnounced {
            stage,
            starting: stage.starting_inventory(),
        });

        self.take_turn(state, conn, console).await
    }

    /// Handles one complete message from the opponent and, unless the
    /// session ends, answers it with the local player's next move.
    ///
    /// The received state replaces `state` wholesale, but only once it has
    /// been checked. A rejected message leaves `state` as it was.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] or [`ProtocolError::InvalidMessage`]
    /// (wrapped) when the message is unusable, [`EngineError::InvalidPhase`]
    /// after the session ended, and any error from sending.
    pub async fn handle_message<C, K>(
        &mut self,
        state: &mut GameState,
        incoming: &str,
        conn: &mut C,
        console: &mut K,
    ) -> Result<EndGameCode, EngineError>
    where
        C: Connection,
        K: Console,
    {
        if !self.phase.is_active() {
            return Err(EngineError::InvalidPhase {
                expected: EnginePhase::Playing,
                actual: self.phase,
            });
        }
        if self.is_round_scorer() {
            self.expect_phase(EnginePhase::Playing)?;
        }

        let received = match WireMessage::parse(incoming, &self.codec)? {
            WireMessage::Quit => {
                tracing::debug!(player = %self.local, "opponent sent quit");
                self.phase = EnginePhase::SessionEnded;
                return Ok(EndGameCode::OpponentQuit);
            }
            WireMessage::State(received) => received,
        };

        let Some(stage) = received.stage else {
            return Err(invalid("state carries no stage"));
        };
        if self.phase == EnginePhase::Playing {
            if let Some(current) = state.stage.filter(|s| *s != stage) {
                return Err(invalid(format!(
                    "stage changed from {current} to {stage} mid-session"
                )));
            }
        }

        if received.turn_owner != self.local.other() {
            return Err(invalid(format!(
                "state was not handed over to {}",
                self.local
            )));
        }
        for slot in [PlayerSlot::Player1, PlayerSlot::Player2] {
            let inventory = received.player(slot).move_inventory;
            if inventory.checked_total().is_none() {
                return Err(invalid(format!(
                    "{slot} inventory {inventory} is out of range"
                )));
            }
        }

        let total_before = state.player(self.local).move_inventory.total();
        *state = received;
        state.change_turn();
        tracing::debug!(
            conn_id = %conn.id(),
            player = %self.local,
            "turn handed over"
        );

        if state.current_move(self.local.other()) == Some(Play::Quit) {
            tracing::debug!(player = %self.local, "opponent played quit");
            self.phase = EnginePhase::SessionEnded;
            return Ok(EndGameCode::OpponentQuit);
        }

        if self.phase == EnginePhase::AwaitingStageSelection {
            self.phase = EnginePhase::Playing;
            tracing::info!(player = %self.local, stage = ?stage, "stage received");
            console.notify(GameEvent::StageAnnounced {
                stage,
                starting: stage.starting_inventory(),
            });
        } else if !self.is_round_scorer() {
            let inventory = state.player(self.local).move_inventory;
            if inventory.total() > total_before {
                console.notify(GameEvent::Regenerated { inventory });
            }
        }

        if self.is_round_scorer() {
            self.score_round(state, console);
        }

        let code = self.take_turn(state, conn, console).await?;
        if code == EndGameCode::Continue && !self.is_round_scorer() {
            // Display only; the scorer's state overwrites this next turn.
            if let Some(report) = resolve_round(state, self.local) {
                console.notify(GameEvent::RoundResolved(report));
            }
        }
        Ok(code)
    }

    fn expect_phase(&self, expected: EnginePhase) -> Result<(), EngineError> {
        if self.phase != expected {
            return Err(EngineError::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Resolves the round just completed by the opponent's reply, then
    /// tops up every inventory that ran low.
    fn score_round<K: Console>(&mut self, state: &mut GameState, console: &mut K) {
        let Some(report) = resolve_round(state, self.local) else {
            return;
        };
        tracing::debug!(
            player = %self.local,
            winner = ?report.winner,
            local_score = report.local_score,
            opponent_score = report.opponent_score,
            "round resolved"
        );
        console.notify(GameEvent::RoundResolved(report));

        for slot in [PlayerSlot::Player1, PlayerSlot::Player2] {
            let inventory = &mut state.player_mut(slot).move_inventory;
            if regenerate(inventory, &self.rules, &mut self.rng) {
                tracing::debug!(player = %slot, inventory = %inventory, "inventory regenerated");
                if slot == self.local {
                    console.notify(GameEvent::Regenerated {
                        inventory: *inventory,
                    });
                }
            }
        }
    }

    /// Asks for the local move, records it, and sends the state.
    async fn take_turn<C, K>(
        &mut self,
        state: &mut GameState,
        conn: &mut C,
        console: &mut K,
    ) -> Result<EndGameCode, EngineError>
    where
        C: Connection,
        K: Console,
    {
        let inventory = state.player(self.local).move_inventory;
        let play = console.choose_play(&inventory).await;

        let player = state.player_mut(self.local);
        if let Play::Move(m) = play {
            if !player.move_inventory.take(m) {
                return Err(EngineError::MoveUnavailable(m));
            }
        }
        player.current_move = Some(play);

        let text = self.codec.encode(&*state)?;
        self.framer.send_message(conn, &text).await?;
        tracing::debug!(
            conn_id = %conn.id(),
            player = %self.local,
            play = %play,
            "state sent"
        );

        if play.is_quit() {
            self.phase = EnginePhase::SessionEnded;
            return Ok(EndGameCode::LocalQuit);
        }
        Ok(EndGameCode::Continue)
    }
}

fn invalid(reason: impl Into<String>) -> EngineError {
    EngineError::Protocol(ProtocolError::InvalidMessage(reason.into()))
}
