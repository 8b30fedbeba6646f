#![allow(dead_code)]

use nwins::{
    config::{keys, AgentParams},
    Agent, GameAction, GameEngine, GameSettings, GameSide, NWinsError,
};

/// Routes `log` output through the test harness
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parameters shared by every learning agent in the tests
pub fn training_params(seed: u64) -> AgentParams {
    AgentParams::new()
        .with_number(keys::ALPHA, 0.1)
        .with_number(keys::GAMMA, 0.9)
        .with_text(keys::EXP_STRATEGY, "epsilon_greedy_lindecay")
        .with_number(keys::START_EPSILON, 1.0)
        .with_number(keys::MIN_EPSILON, 0.1)
        .with_number(keys::DECAY_EPISODES, 500.0)
        .with_number(keys::SEED, seed as f64)
}

/// Plays one game to the end, then hands the engine to both agents
pub fn play_game<X, Y>(
    settings: &GameSettings,
    side_a: &mut X,
    side_b: &mut Y,
) -> Result<GameEngine, NWinsError>
where
    X: Agent + ?Sized,
    Y: Agent + ?Sized,
{
    let mut engine = GameEngine::new(settings.clone())?;
    let mut last_action: Option<GameAction> = None;

    while !engine.is_terminal() {
        let state = engine.current_state().clone();
        let action = match engine.acting_side() {
            GameSide::SideA => side_a.choose_action(&state, last_action)?,
            _ => side_b.choose_action(&state, last_action)?,
        };
        engine.apply_action(action)?;
        last_action = Some(action);
    }

    side_a.on_game_over(&engine, last_action)?;
    side_b.on_game_over(&engine, last_action)?;
    Ok(engine)
}

/// Applies `(column, side)` moves to a fresh engine
pub fn replay(settings: &GameSettings, moves: &[(usize, GameSide)]) -> GameEngine {
    let mut engine = GameEngine::new(settings.clone()).unwrap();
    for &(column, side) in moves {
        engine.apply_action(GameAction::new(column, side)).unwrap();
    }
    engine
}
