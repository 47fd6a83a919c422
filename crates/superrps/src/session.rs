//! The session driver: one connection, one game, start to finish.
//!
//! A [`Session`] owns the connection, the player's console, the turn
//! engine, and the [`GameState`]. It runs the loop
//!
//! ```text
//! (Player 1 only) open
//! loop: wait → receive message → engine.handle_message → until final
//! ```
//!
//! and turns whatever ends it into a [`SessionReport`]. The peers read and
//! write in lockstep, so there is exactly one task per session and no
//! shared state.

use rand::rngs::StdRng;
use superrps_engine::{Console, EndGameCode, GameEvent, TurnEngine};
use superrps_protocol::{GameState, PlayerSlot};
use superrps_transport::{connect, Connection, TcpTransport, Transport};

use crate::{SessionConfig, SuperRpsError};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    LocalQuit,
    OpponentQuit,
    /// The opponent sent something unusable or the connection dropped.
    /// Carries the error text.
    OpponentError(String),
}

/// Final result of a session, from the local player's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub local_score: u32,
    pub opponent_score: u32,
}

/// Drives one peer's side of a game over connection `C`, talking to the
/// player through console `K`.
pub struct Session<C, K> {
    conn: C,
    console: K,
    engine: TurnEngine<StdRng>,
    state: GameState,
}

impl<C: Connection, K: Console> Session<C, K> {
    pub fn new(
        conn: C,
        console: K,
        local: PlayerSlot,
        config: &SessionConfig,
    ) -> Self {
        let engine = TurnEngine::new(local, config.rules, config.rng())
            .with_framer(config.framer());
        Self {
            conn,
            console,
            engine,
            state: GameState::new(),
        }
    }

    pub fn local(&self) -> PlayerSlot {
        self.engine.local()
    }

    /// The latest state seen or produced by this peer.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn console(&self) -> &K {
        &self.console
    }

    /// Plays the session to the end and closes the connection.
    ///
    /// Opponent errors (see [`SuperRpsError::is_opponent_error`]) are
    /// reported to the console and folded into the returned report.
    ///
    /// # Errors
    /// Only local faults are returned as `Err`.
    pub async fn run(&mut self) -> Result<SessionReport, SuperRpsError> {
        let conn_id = self.conn.id();
        let player = self.local();
        tracing::info!(%conn_id, %player, "session started");

        let outcome = match self.drive().await {
            Ok(code) => {
                let (local_score, opponent_score) =
                    self.state.scores_for(player);
                self.console.notify(GameEvent::GameOver {
                    code,
                    local_score,
                    opponent_score,
                });
                if code == EndGameCode::OpponentQuit {
                    SessionOutcome::OpponentQuit
                } else {
                    SessionOutcome::LocalQuit
                }
            }
            Err(e) if e.is_opponent_error() => {
                tracing::warn!(%conn_id, error = %e, "opponent error");
                let reason = e.to_string();
                self.console.notify(GameEvent::OpponentError {
                    reason: reason.clone(),
                });
                SessionOutcome::OpponentError(reason)
            }
            Err(e) => {
                tracing::error!(%conn_id, error = %e, "session failed");
                self.close().await;
                return Err(e);
            }
        };

        self.close().await;
        let (local_score, opponent_score) = self.state.scores_for(player);
        tracing::info!(
            %conn_id,
            ?outcome,
            local_score,
            opponent_score,
            "session ended"
        );
        Ok(SessionReport {
            outcome,
            local_score,
            opponent_score,
        })
    }

    async fn drive(&mut self) -> Result<EndGameCode, SuperRpsError> {
        let mut code = if self.engine.is_round_scorer() {
            self.engine
                .open(&mut self.state, &mut self.conn, &mut self.console)
                .await?
        } else {
            EndGameCode::Continue
        };

        let framer = self.engine.framer();
        while !code.is_final() {
            self.console.notify(GameEvent::WaitingForOpponent);
            let incoming = framer.receive_message(&mut self.conn).await?;
            tracing::debug!(
                conn_id = %self.conn.id(),
                bytes = incoming.len(),
                "message received"
            );
            code = self
                .engine
                .handle_message(
                    &mut self.state,
                    &incoming,
                    &mut self.conn,
                    &mut self.console,
                )
                .await?;
        }
        Ok(code)
    }

    async fn close(&mut self) {
        if let Err(e) = self.conn.close().await {
            tracing::debug!(conn_id = %self.conn.id(), error = %e, "close failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Accepts one peer from `transport` and plays as Player 2.
pub async fn serve_one<T, K>(
    transport: &mut T,
    console: K,
    config: &SessionConfig,
) -> Result<SessionReport, SuperRpsError>
where
    T: Transport,
    K: Console,
{
    let conn = transport.accept().await?;
    Session::new(conn, console, PlayerSlot::Player2, config)
        .run()
        .await
}

/// Listens on `config.bind_addr`, waits for Player 1, and plays one
/// session as Player 2.
pub async fn host<K: Console>(
    config: &SessionConfig,
    console: K,
) -> Result<SessionReport, SuperRpsError> {
    let mut transport = TcpTransport::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "waiting for player 1");
    serve_one(&mut transport, console, config).await
}

/// Dials `config.server_addr` and plays one session as Player 1.
pub async fn join<K: Console>(
    config: &SessionConfig,
    console: K,
) -> Result<SessionReport, SuperRpsError> {
    let conn = connect(&config.server_addr).await?;
    Session::new(conn, console, PlayerSlot::Player1, config)
        .run()
        .await
}
