mod common;

use common::replay;
use nwins::{
    BoardState, GameAction, GameEngine, GameResult, GameSettings, GameSide, GameSummary,
    NWinsError,
};

use GameSide::{SideA as A, SideB as B};

fn default_settings() -> GameSettings {
    GameSettings::default()
        .with_rows(4)
        .with_columns(5)
        .with_stones_to_connect(4)
}

#[test]
fn test_vertical_win_rewards_the_winner_only() {
    common::init_logger();
    let moves = [(0, A), (1, B), (0, A), (1, B), (0, A), (1, B), (0, A)];
    let engine = replay(&default_settings(), &moves);

    assert!(engine.is_terminal());
    assert_eq!(engine.result(), Some(GameResult::WinSideA));
    assert_eq!(engine.result().and_then(|r| r.winner()), Some(A));

    let logs = engine.all_actions();
    let (last, earlier) = logs.split_last().unwrap();
    assert_eq!(last.reward, 1.0);
    assert!(last.is_terminal);
    for log in earlier {
        assert_eq!(log.reward, 0.0);
        assert!(!log.is_terminal);
    }
}

#[test]
fn test_full_board_without_connection_is_a_tie() {
    common::init_logger();
    #[rustfmt::skip]
    let moves = [
        (0, A), (1, B), (2, A), (3, B), (4, A),
        (4, B), (3, A), (2, B), (1, A), (0, B),
        (0, A), (1, B), (2, A), (3, B), (4, A),
        (3, B), (4, A), (2, B), (0, A), (1, B),
    ];
    let engine = replay(&default_settings(), &moves);

    assert!(engine.is_terminal());
    assert!(engine.current_state().is_full());
    assert_eq!(engine.result(), Some(GameResult::Tie));
    assert_eq!(engine.result().and_then(|r| r.winner()), None);

    let logs = engine.all_actions();
    let last_a = engine.actions_of(A).last().cloned().unwrap();
    let last_b = engine.actions_of(B).last().cloned().unwrap();
    assert_eq!(last_a.reward, 0.5);
    assert_eq!(last_b.reward, 0.5);
    for log in &logs[..logs.len() - 2] {
        assert_eq!(log.reward, 0.0);
    }
}

#[test]
fn test_tie_on_tiny_board_rewards_both_final_moves() {
    let settings = GameSettings::default()
        .with_rows(1)
        .with_columns(2)
        .with_stones_to_connect(2);
    let mut engine = GameEngine::new(settings).unwrap();

    let first = engine.apply_action(GameAction::new(0, A)).unwrap().clone();
    // one cell left, the opponent's only reply cannot win
    assert_eq!(first.reward, 0.5);
    assert!(!first.is_terminal);
    assert_eq!(engine.result(), None);

    let second = engine.apply_action(GameAction::new(1, B)).unwrap().clone();
    assert_eq!(second.reward, 0.5);
    assert!(second.is_terminal);
    assert_eq!(engine.result(), Some(GameResult::Tie));
}

#[test]
fn test_win_before_the_board_is_full() {
    let settings = GameSettings::default()
        .with_rows(2)
        .with_columns(2)
        .with_stones_to_connect(2);
    let engine = replay(&settings, &[(0, A), (0, B), (1, A)]);

    assert_eq!(engine.result(), Some(GameResult::WinSideA));
    let rewards: Vec<f64> = engine.history().iter().map(|log| log.reward).collect();
    assert_eq!(rewards, vec![0.0, 0.0, 1.0]);
    assert!(!engine.current_state().is_full());
}

#[test]
fn test_actions_after_the_end_are_rejected() {
    let moves = [(0, A), (1, B), (0, A), (1, B), (0, A), (1, B), (0, A)];
    let mut engine = replay(&default_settings(), &moves);

    let result = engine.apply_action(GameAction::new(1, B));
    assert!(matches!(result, Err(NWinsError::InvalidAction(_))));
    assert_eq!(engine.history().len(), moves.len());
}

#[test]
fn test_illegal_actions_leave_history_unchanged() {
    let mut engine = GameEngine::new(default_settings()).unwrap();
    assert!(matches!(
        engine.apply_action(GameAction::new(0, B)),
        Err(NWinsError::InvalidAction(_))
    ));
    assert!(matches!(
        engine.apply_action(GameAction::new(9, A)),
        Err(NWinsError::InvalidAction(_))
    ));
    assert!(engine.history().is_empty());
    assert_eq!(engine.acting_side(), A);
}

#[test]
fn test_engine_tracks_turns_and_resets() {
    let mut engine = GameEngine::new(default_settings()).unwrap();
    assert_eq!(engine.result(), None);
    assert_eq!(engine.last_action(), None);
    assert_eq!(engine.possible_actions().len(), 5);

    engine.apply_action(GameAction::new(2, A)).unwrap();
    assert_eq!(engine.acting_side(), B);
    assert_eq!(engine.last_action(), Some(GameAction::new(2, A)));
    assert_eq!(engine.current_state().column_height(2), 1);
    assert_eq!(engine.last_log().map(|log| log.action.column), Some(2));

    engine.reset();
    assert!(engine.history().is_empty());
    assert_eq!(engine.acting_side(), A);
    assert_eq!(engine.current_state().stone_count(), 0);
}

#[test]
fn test_logs_chain_states() {
    let engine = replay(&default_settings(), &[(0, A), (4, B), (2, A)]);
    let logs = engine.history();
    for pair in logs.windows(2) {
        assert_eq!(pair[0].new_state, pair[1].old_state);
    }
    assert_eq!(engine.actions_of(A).len(), 2);
    assert_eq!(engine.actions_of(B).len(), 1);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let too_long = default_settings().with_stones_to_connect(6);
    assert!(matches!(
        GameEngine::new(too_long),
        Err(NWinsError::InvalidArgument(_))
    ));
    let no_rows = default_settings().with_rows(0);
    assert!(matches!(
        GameEngine::new(no_rows),
        Err(NWinsError::InvalidArgument(_))
    ));
}

#[test]
fn test_large_board_engine() {
    let settings = GameSettings::default()
        .with_rows(13)
        .with_columns(5)
        .with_stones_to_connect(4);
    // A completes the diagonal (0,0) .. (3,3)
    #[rustfmt::skip]
    let moves = [
        (0, A), (1, B), (1, A), (2, B), (2, A), (3, B),
        (2, A), (3, B), (3, A), (0, B), (3, A),
    ];
    let engine = replay(&settings, &moves);
    assert_eq!(engine.result(), Some(GameResult::WinSideA));
    assert!(!engine.current_state().is_packed());
}
