//! Integration tests for the turn engine.
//!
//! The engine under test talks to one end of a duplex pair; the test
//! plays the opponent on the other end by reading what was sent and
//! writing hand-built replies.

use rand::rngs::StdRng;
use rand::SeedableRng;
use superrps_engine::{
    EndGameCode, EngineError, EnginePhase, GameEvent, RoundReport, RulesConfig,
    ScriptedConsole, TurnEngine,
};
use superrps_protocol::{
    receive_message, GameState, Inventory, JsonCodec, Move, Play, PlayerSlot,
    ProtocolError, RoundWinner, Stage, WireMessage,
};
use superrps_transport::{duplex_pair, StreamConnection};
use tokio::io::DuplexStream;

type Conn = StreamConnection<DuplexStream>;

fn engine(local: PlayerSlot, seed: u64) -> TurnEngine<StdRng> {
    TurnEngine::new(local, RulesConfig::default(), StdRng::seed_from_u64(seed))
}

fn console(stage: Option<Stage>, plays: &[Play]) -> ScriptedConsole {
    let console = ScriptedConsole::new().with_plays(plays.iter().copied());
    match stage {
        Some(stage) => console.with_stage(stage),
        None => console,
    }
}

/// Reads the next message the engine sent and decodes it as a state.
async fn next_state(peer: &mut Conn) -> GameState {
    let text = receive_message(peer).await.unwrap();
    match WireMessage::parse(&text, &JsonCodec).unwrap() {
        WireMessage::State(state) => state,
        WireMessage::Quit => panic!("expected a state, got quit"),
    }
}

/// What `from` would send after receiving `state` and playing `play`.
fn reply(state: &GameState, from: PlayerSlot, play: Play) -> String {
    let mut next = state.clone();
    next.turn_owner = from;
    if let Play::Move(m) = play {
        assert!(next.player_mut(from).move_inventory.take(m));
    }
    next.player_mut(from).current_move = Some(play);
    serde_json::to_string(&next).unwrap()
}

/// The first state Player 1 sends on `stage` after playing `play`.
fn opening(stage: Stage, play: Move) -> GameState {
    let mut state = GameState::new();
    state.install_stage(stage);
    state.players.player1.move_inventory.take(play);
    state.players.player1.current_move = Some(Play::Move(play));
    state
}

fn json(state: &GameState) -> String {
    serde_json::to_string(state).unwrap()
}

// =========================================================================
// Opening
// =========================================================================

#[tokio::test]
async fn test_open_installs_stage_and_sends_first_move() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console = console(Some(Stage::Office), &[Move::Rock.into()]);
    let mut state = GameState::new();

    let code = engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    assert_eq!(code, EndGameCode::Continue);
    assert_eq!(engine.phase(), EnginePhase::Playing);

    let sent = next_state(&mut peer).await;
    assert_eq!(sent, state);
    assert_eq!(sent.stage, Some(Stage::Office));
    assert_eq!(sent.turn_owner, PlayerSlot::Player1);
    assert_eq!(sent.players.player1.move_inventory, Inventory::new(0, 2, 2));
    assert_eq!(sent.players.player2.move_inventory, Inventory::new(1, 2, 2));
    assert_eq!(sent.players.player1.current_move, Some(Play::Move(Move::Rock)));
    assert_eq!(sent.round_winner, RoundWinner::Unset);

    assert_eq!(
        console.events(),
        &[GameEvent::StageAnnounced {
            stage: Stage::Office,
            starting: Inventory::new(1, 2, 2),
        }]
    );
}

#[tokio::test]
async fn test_quit_at_stage_prompt_sends_bare_quit() {
    let (mut conn, mut peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console = console(None, &[]);
    let mut state = GameState::new();

    let code = engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    assert_eq!(code, EndGameCode::LocalQuit);
    assert_eq!(engine.phase(), EnginePhase::SessionEnded);
    assert_eq!(receive_message(&mut peer).await.unwrap(), "\\q");
    assert_eq!(state.stage, None);
}

#[tokio::test]
async fn test_player2_cannot_open() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(Some(Stage::Heaven), &[]);
    let mut state = GameState::new();

    let result = engine.open(&mut state, &mut conn, &mut console).await;
    assert!(matches!(
        result,
        Err(EngineError::NotStageSelector(PlayerSlot::Player2))
    ));
}

// =========================================================================
// Turns
// =========================================================================

#[tokio::test]
async fn test_player2_adopts_stage_and_mirrors_round() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Move::Paper.into()]);
    let mut state = GameState::new();

    let incoming = json(&opening(Stage::Office, Move::Rock));
    let code = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::Continue);
    assert_eq!(engine.phase(), EnginePhase::Playing);

    // The mirrored score stays local.
    let sent = next_state(&mut peer).await;
    assert_eq!(sent.turn_owner, PlayerSlot::Player2);
    assert_eq!(sent.scores_for(PlayerSlot::Player2), (0, 0));
    assert_eq!(sent.round_winner, RoundWinner::Unset);
    assert_eq!(sent.players.player2.move_inventory, Inventory::new(1, 1, 2));
    assert_eq!(sent.players.player2.current_move, Some(Play::Move(Move::Paper)));

    assert_eq!(state.scores_for(PlayerSlot::Player2), (1, 0));
    assert_eq!(
        console.events(),
        &[
            GameEvent::StageAnnounced {
                stage: Stage::Office,
                starting: Inventory::new(1, 2, 2),
            },
            GameEvent::RoundResolved(RoundReport {
                local_move: Move::Paper,
                opponent_move: Move::Rock,
                winner: RoundWinner::Player2,
                local_score: 1,
                opponent_score: 0,
            }),
        ]
    );
}

#[tokio::test]
async fn test_player1_scores_round_on_reply() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Office), &[Move::Rock.into(), Move::Paper.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let first = next_state(&mut peer).await;

    let incoming = reply(&first, PlayerSlot::Player2, Move::Paper.into());
    let code = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::Continue);

    let sent = next_state(&mut peer).await;
    assert_eq!(sent.round_winner, RoundWinner::Player2);
    assert_eq!(sent.players.player2.score, 1);
    assert_eq!(sent.players.player1.score, 0);
    assert_eq!(sent.players.player1.move_inventory.rock, 0);
    assert_eq!(sent.players.player1.move_inventory, Inventory::new(0, 1, 2));
    assert_eq!(sent.turn_owner, PlayerSlot::Player1);

    assert!(console.events().contains(&GameEvent::RoundResolved(RoundReport {
        local_move: Move::Rock,
        opponent_move: Move::Paper,
        winner: RoundWinner::Player2,
        local_score: 0,
        opponent_score: 1,
    })));
}

#[tokio::test]
async fn test_turn_owner_returns_after_full_exchange() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Heaven), &[Move::Rock.into(), Move::Rock.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let before = next_state(&mut peer).await.turn_owner;

    let incoming = reply(&state, PlayerSlot::Player2, Move::Scissors.into());
    engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(next_state(&mut peer).await.turn_owner, before);
}

#[tokio::test]
async fn test_regeneration_tops_up_low_inventories() {
    async fn run(seed: u64) -> (GameState, Vec<GameEvent>) {
        let (mut conn, mut peer) = duplex_pair(64 * 1024);
        let mut engine = engine(PlayerSlot::Player1, seed);
        let mut console = console(
            Some(Stage::Mountain),
            &[Move::Rock.into(), Play::Quit],
        );
        let mut state = GameState::new();
        engine.open(&mut state, &mut conn, &mut console).await.unwrap();
        let mut first = next_state(&mut peer).await;

        // Both players are nearly out of moves.
        first.players.player1.move_inventory = Inventory::new(0, 0, 1);
        first.players.player2.move_inventory = Inventory::new(0, 1, 1);
        let incoming = reply(&first, PlayerSlot::Player2, Move::Paper.into());

        let code = engine
            .handle_message(&mut state, &incoming, &mut conn, &mut console)
            .await
            .unwrap();
        assert_eq!(code, EndGameCode::LocalQuit);
        (next_state(&mut peer).await, console.events().to_vec())
    }

    let (sent, events) = run(42).await;
    let rules = RulesConfig::default();
    let added = rules.regen_quantity_each * rules.regen_iterations;
    assert_eq!(sent.players.player1.move_inventory.total(), 1 + added);
    assert_eq!(sent.players.player2.move_inventory.total(), 1 + added);
    assert!(sent.players.player1.move_inventory.scissors >= 1);
    assert!(events.contains(&GameEvent::Regenerated {
        inventory: sent.players.player1.move_inventory,
    }));

    let (again, _) = run(42).await;
    assert_eq!(again, sent);
}

#[tokio::test]
async fn test_player2_is_told_about_regeneration() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console =
        console(None, &[Move::Paper.into(), Move::Scissors.into()]);
    let mut state = GameState::new();

    let incoming = json(&opening(Stage::Office, Move::Rock));
    engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    let mut answered = next_state(&mut peer).await;

    answered.players.player2.move_inventory.add(Move::Rock, 2);
    let topped_up = answered.players.player2.move_inventory;
    let incoming = reply(&answered, PlayerSlot::Player1, Move::Paper.into());
    engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();

    assert!(console
        .events()
        .contains(&GameEvent::Regenerated { inventory: topped_up }));
}

// =========================================================================
// Quitting
// =========================================================================

#[tokio::test]
async fn test_opponent_quit_in_state_ends_session() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Armory), &[Move::Rock.into(), Move::Rock.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let first = next_state(&mut peer).await;

    let incoming = reply(&first, PlayerSlot::Player2, Play::Quit);
    let code = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::OpponentQuit);
    assert_eq!(engine.phase(), EnginePhase::SessionEnded);
    assert_eq!(console.remaining_plays(), 1);
    assert_eq!(state.scores_for(PlayerSlot::Player1), (0, 0));
    assert_eq!(state.round_winner, RoundWinner::Unset);
}

#[tokio::test]
async fn test_bare_quit_ends_session_before_stage() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Move::Rock.into()]);
    let mut state = GameState::new();

    let code = engine
        .handle_message(&mut state, "\\q", &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::OpponentQuit);
    assert_eq!(engine.phase(), EnginePhase::SessionEnded);
    assert!(console.events().is_empty());
}

#[tokio::test]
async fn test_local_quit_skips_decrement_and_scoring() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Play::Quit]);
    let mut state = GameState::new();

    let incoming = json(&opening(Stage::Office, Move::Rock));
    let code = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::LocalQuit);

    let sent = next_state(&mut peer).await;
    assert_eq!(sent.players.player2.current_move, Some(Play::Quit));
    assert_eq!(sent.players.player2.move_inventory, Inventory::new(1, 2, 2));
    assert_eq!(state.scores_for(PlayerSlot::Player2), (0, 0));
    assert!(!console
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::RoundResolved(_))));
}

#[tokio::test]
async fn test_message_after_session_end_is_rejected() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[]);
    let mut state = GameState::new();

    engine
        .handle_message(&mut state, "\\q", &mut conn, &mut console)
        .await
        .unwrap();
    let result = engine
        .handle_message(&mut state, "\\q", &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::InvalidPhase {
            expected: EnginePhase::Playing,
            actual: EnginePhase::SessionEnded,
        })
    ));
}

// =========================================================================
// Bad input
// =========================================================================

#[tokio::test]
async fn test_garbage_is_a_decode_error() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Move::Rock.into()]);
    let mut state = GameState::new();

    for text in ["OFFICE", "{\"turn_owner\":", ""] {
        let result = engine
            .handle_message(&mut state, text, &mut conn, &mut console)
            .await;
        assert!(
            matches!(result, Err(EngineError::Protocol(ProtocolError::Decode(_)))),
            "{text:?}"
        );
    }
    assert_eq!(state, GameState::new());
}

#[tokio::test]
async fn test_state_without_stage_is_invalid() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Move::Rock.into()]);
    let mut state = GameState::new();

    let incoming = json(&GameState::new());
    let result = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
}

#[tokio::test]
async fn test_stage_cannot_change_mid_session() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console =
        console(None, &[Move::Paper.into(), Move::Paper.into()]);
    let mut state = GameState::new();

    let incoming = json(&opening(Stage::Office, Move::Rock));
    engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    let mut answered = next_state(&mut peer).await;

    answered.stage = Some(Stage::Heaven);
    let incoming = reply(&answered, PlayerSlot::Player1, Move::Paper.into());
    let result = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
}

#[tokio::test]
async fn test_state_not_handed_over_is_invalid() {
    let (mut conn, _peer) = duplex_pair(1024);
    let mut engine = engine(PlayerSlot::Player2, 1);
    let mut console = console(None, &[Move::Rock.into()]);
    let mut state = GameState::new();

    let mut wrong = opening(Stage::Heaven, Move::Rock);
    wrong.turn_owner = PlayerSlot::Player2;
    let result = engine
        .handle_message(&mut state, &json(&wrong), &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
}

#[tokio::test]
async fn test_rejected_state_leaves_local_state_untouched() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Office), &[Move::Rock.into(), Move::Paper.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let first = next_state(&mut peer).await;
    let before = state.clone();

    // Claims to come from Player 1 and rewrites the scores.
    let mut wrong = first.clone();
    wrong.players.player1.score = 7;
    wrong.players.player2.score = 9;
    let incoming = reply(&wrong, PlayerSlot::Player1, Move::Paper.into());
    let result = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
    assert_eq!(state, before);
    assert_eq!(console.remaining_plays(), 1);
}

#[tokio::test]
async fn test_inventory_too_large_to_count_is_invalid() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Office), &[Move::Rock.into(), Move::Paper.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let mut first = next_state(&mut peer).await;
    let before = state.clone();

    first.players.player2.move_inventory = Inventory::new(u32::MAX, 1, 0);
    let incoming = reply(&first, PlayerSlot::Player2, Move::Paper.into());
    let result = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
    assert_eq!(state, before);
    assert!(!console
        .events()
        .iter()
        .any(|e| matches!(e, GameEvent::RoundResolved(_))));
}

#[tokio::test]
async fn test_maximum_score_does_not_overflow() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Office), &[Move::Rock.into(), Play::Quit]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let mut first = next_state(&mut peer).await;

    first.players.player2.score = u32::MAX;
    let incoming = reply(&first, PlayerSlot::Player2, Move::Paper.into());
    let code = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await
        .unwrap();
    assert_eq!(code, EndGameCode::LocalQuit);
    assert_eq!(next_state(&mut peer).await.players.player2.score, u32::MAX);
}

#[tokio::test]
async fn test_depleted_move_from_console_is_rejected() {
    let (mut conn, mut peer) = duplex_pair(64 * 1024);
    let mut engine = engine(PlayerSlot::Player1, 1);
    let mut console =
        console(Some(Stage::Office), &[Move::Rock.into(), Move::Rock.into()]);
    let mut state = GameState::new();

    engine.open(&mut state, &mut conn, &mut console).await.unwrap();
    let first = next_state(&mut peer).await;

    let incoming = reply(&first, PlayerSlot::Player2, Move::Scissors.into());
    let result = engine
        .handle_message(&mut state, &incoming, &mut conn, &mut console)
        .await;
    assert!(matches!(result, Err(EngineError::MoveUnavailable(Move::Rock))));
    assert_eq!(state.players.player1.move_inventory.rock, 0);
}
