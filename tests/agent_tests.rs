mod common;

use common::{play_game, training_params};
use nwins::{
    agent::{
        create_agent, DoubleQAgent, DynaQAgent, QLearningAgent, RandomAgent, SarsaLambdaAgent,
    },
    config::keys,
    Agent, AgentKind, AgentMode, AgentParams, BoardState, GameAction, GameEngine, GameResult,
    GameSettings, GameSide, GameState, GameSummary, NWinsError, TrainableAgent,
};

use GameSide::{None as N, SideA as A, SideB as B};

fn small_settings() -> GameSettings {
    GameSettings::default()
        .with_rows(3)
        .with_columns(3)
        .with_stones_to_connect(3)
}

/// A 1x2 board where the first stone wins
fn instant_win_settings() -> GameSettings {
    GameSettings::default()
        .with_rows(1)
        .with_columns(2)
        .with_stones_to_connect(1)
}

fn full_params(seed: u64) -> AgentParams {
    training_params(seed)
        .with_text(keys::COMBINE_QTABLES, "sum")
        .with_number(keys::DYNAQ_MEMORY_SIZE, 1000.0)
        .with_number(keys::DYNAQ_STEPS, 10.0)
        .with_number(keys::DYNAQ_MIN_MEMORY, 20.0)
        .with_number(keys::LAMBDA, 0.8)
}

/// Lets `agent` play the winning first move of the instant-win board
fn instant_win<X: Agent + ?Sized>(agent: &mut X) -> (GameState, GameAction, GameEngine) {
    let mut engine = GameEngine::new(instant_win_settings()).unwrap();
    let state = engine.current_state().clone();
    let action = agent.choose_action(&state, None).unwrap();
    engine.apply_action(action).unwrap();
    assert_eq!(engine.result(), Some(GameResult::WinSideA));
    (state, action, engine)
}

#[test]
fn test_random_agent_never_picks_full_column() {
    for full in 0..5 {
        // only column `full` is filled, alternating sides
        let mut cells = vec![N; 20];
        for row in 0..4 {
            cells[row * 5 + full] = if row % 2 == 0 { A } else { B };
        }
        let state = GameState::from_cells(4, 5, &cells).unwrap();

        let mut agent = RandomAgent::with_seed(full as u64);
        for _ in 0..200 {
            let action = agent.choose_action(&state, None).unwrap();
            assert_ne!(action.column, full);
            assert_eq!(action.side, A);
        }
    }
}

#[test]
fn test_random_agent_finds_the_only_open_column() {
    for open in 0..5 {
        let mut cells = vec![N; 20];
        for column in (0..5).filter(|&c| c != open) {
            for row in 0..4 {
                cells[row * 5 + column] = if (row + column) % 2 == 0 { A } else { B };
            }
        }
        let state = GameState::from_cells(4, 5, &cells).unwrap();

        let mut agent = RandomAgent::with_seed(99);
        for _ in 0..50 {
            assert_eq!(agent.choose_action(&state, None).unwrap().column, open);
        }
    }
}

#[test]
fn test_random_agent_on_full_board() {
    let mut state = GameState::empty(1, 2).unwrap();
    state = state.apply_action(&GameAction::new(0, A)).unwrap();
    state = state.apply_action(&GameAction::new(1, B)).unwrap();
    let mut agent = RandomAgent::with_seed(1);
    assert!(matches!(
        agent.choose_action(&state, None),
        Err(NWinsError::NoLegalActions)
    ));
}

#[test]
fn test_missing_parameters_are_reported() {
    let cases = [
        (AgentKind::SimpleQL, keys::ALPHA),
        (AgentKind::SimpleQL, keys::GAMMA),
        (AgentKind::SimpleQL, keys::EXP_STRATEGY),
        (AgentKind::DoubleQL, keys::COMBINE_QTABLES),
        (AgentKind::DynaQL, keys::DYNAQ_MEMORY_SIZE),
        (AgentKind::DynaQL, keys::DYNAQ_STEPS),
        (AgentKind::DynaQL, keys::DYNAQ_MIN_MEMORY),
        (AgentKind::SarsaLambda, keys::LAMBDA),
        (AgentKind::SarsaLambda, keys::ALPHA),
    ];
    for (kind, missing) in cases {
        let mut params = AgentParams::new();
        for key in [
            keys::ALPHA,
            keys::GAMMA,
            keys::EXP_STRATEGY,
            keys::START_EPSILON,
            keys::MIN_EPSILON,
            keys::DECAY_EPISODES,
            keys::COMBINE_QTABLES,
            keys::DYNAQ_MEMORY_SIZE,
            keys::DYNAQ_STEPS,
            keys::DYNAQ_MIN_MEMORY,
            keys::LAMBDA,
        ] {
            if key != missing {
                if let Some(value) = full_params(1).get(key) {
                    params.set(key, value.clone());
                }
            }
        }
        match create_agent(kind, &params, A) {
            Err(NWinsError::MissingParameter(name)) => assert_eq!(name, missing),
            other => panic!("{} without {}: {:?}", kind, missing, other.err()),
        }
    }

    // the random agent needs nothing
    assert!(create_agent(AgentKind::Random, &AgentParams::new(), A).is_ok());
}

#[test]
fn test_unknown_combine_mode_is_rejected() {
    let params = full_params(1).with_text(keys::COMBINE_QTABLES, "max");
    assert!(matches!(
        DoubleQAgent::new(&params, A),
        Err(NWinsError::InvalidArgument(_))
    ));
}

#[test]
fn test_q_learning_terminal_update() {
    let mut agent = QLearningAgent::new(&training_params(4), A).unwrap();
    let (state, action, engine) = instant_win(&mut agent);

    let before = agent.table().value(&state, &action).unwrap();
    agent.on_game_over(&engine, Some(action)).unwrap();
    let after = agent.table().value(&state, &action).unwrap();

    // terminal moves do not bootstrap
    assert!((after - (before + 0.1 * (1.0 - before))).abs() < 1e-12);
    assert_eq!(agent.statistics().episodes, 1);
    assert_eq!(agent.statistics().updates, 1);
}

#[test]
fn test_q_learning_bootstraps_over_opponent_replies() {
    let settings = small_settings();
    let mut agent = QLearningAgent::new(&training_params(8), A).unwrap();
    let mut engine = GameEngine::new(settings).unwrap();
    engine.apply_action(GameAction::new(0, A)).unwrap();
    engine.apply_action(GameAction::new(1, B)).unwrap();
    let first = engine.history()[0].clone();

    // seed the table so the expected target is known
    agent.choose_action(&first.old_state, None).unwrap();
    let before = agent.table().value(&first.old_state, &first.action).unwrap();

    // the game is not over, but learning only looks at the logs
    agent.on_game_over(&engine, None).unwrap();

    let replies = first.new_state.successors().unwrap();
    let best = replies
        .iter()
        .flat_map(|reply| agent.table().get(reply).unwrap().values().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let after = agent.table().value(&first.old_state, &first.action).unwrap();
    assert!((after - (before + 0.1 * (0.9 * best - before))).abs() < 1e-12);
}

#[test]
fn test_double_q_updates_one_table() {
    let mut agent = DoubleQAgent::new(&full_params(5), A).unwrap();
    let (state, action, engine) = instant_win(&mut agent);

    let (first, second) = agent.tables();
    let before = (
        first.value(&state, &action).unwrap(),
        second.value(&state, &action).unwrap(),
    );
    agent.on_game_over(&engine, Some(action)).unwrap();
    let (first, second) = agent.tables();
    let after = (
        first.value(&state, &action).unwrap(),
        second.value(&state, &action).unwrap(),
    );

    let updated = |b: f64| b + 0.1 * (1.0 - b);
    let first_updated = (after.0 - updated(before.0)).abs() < 1e-12 && after.1 == before.1;
    let second_updated = (after.1 - updated(before.1)).abs() < 1e-12 && after.0 == before.0;
    assert!(first_updated ^ second_updated);

    // actions are chosen from the summed tables
    let combined = agent.combined_table();
    assert!((combined.value(&state, &action).unwrap() - (after.0 + after.1)).abs() < 1e-12);
}

#[test]
fn test_dyna_q_plans_once_memory_is_filled() {
    let params = full_params(6)
        .with_number(keys::DYNAQ_MIN_MEMORY, 1.0)
        .with_number(keys::DYNAQ_STEPS, 3.0);
    let mut agent = DynaQAgent::new(&params, A).unwrap();
    let mut opponent = RandomAgent::with_seed(6);

    let engine = play_game(&small_settings(), &mut agent, &mut opponent).unwrap();
    let own_moves = engine.actions_of(A).len();

    assert_eq!(agent.memory().len(), own_moves);
    assert_eq!(agent.statistics().updates, own_moves);
    assert_eq!(agent.statistics().planning_updates, own_moves.min(3));
}

#[test]
fn test_dyna_q_waits_for_minimum_memory() {
    let params = full_params(6).with_number(keys::DYNAQ_MIN_MEMORY, 1000.0);
    let mut agent = DynaQAgent::new(&params, A).unwrap();
    let (state, action, engine) = instant_win(&mut agent);

    let before = agent.table().value(&state, &action).unwrap();
    agent.on_game_over(&engine, Some(action)).unwrap();
    let after = agent.table().value(&state, &action).unwrap();

    assert!((after - (before + 0.1 * (1.0 - before))).abs() < 1e-12);
    assert_eq!(agent.statistics().planning_updates, 0);
    assert_eq!(agent.memory().len(), 1);
}

#[test]
fn test_sarsa_bootstraps_from_sampled_next_action() {
    let mut agent = SarsaLambdaAgent::new(&full_params(7), A).unwrap();
    let (state, action, engine) = instant_win(&mut agent);
    let next = engine.current_state().clone();

    let before = agent.table().value(&state, &action).unwrap();
    agent.on_game_over(&engine, Some(action)).unwrap();
    let after = agent.table().value(&state, &action).unwrap();

    // the won board still has an open cell, so its only action bootstraps
    let reply = next.possible_actions()[0];
    assert_eq!(reply.side, B);
    let next_value = agent.table().value(&next, &reply).unwrap();
    let expected = before + 0.1 * (1.0 + 0.9 * next_value - before);
    assert!((after - expected).abs() < 1e-12);
}

#[test]
fn test_no_learning_outside_training_mode() {
    for mode in [AgentMode::Inference, AgentMode::SemiGreedy] {
        let mut agent = create_agent(AgentKind::SimpleQL, &full_params(2), A).unwrap();
        agent.set_mode(mode);
        assert_eq!(agent.mode(), mode);

        let mut opponent = RandomAgent::with_seed(2);
        for _ in 0..5 {
            play_game(&small_settings(), agent.as_mut(), &mut opponent).unwrap();
        }
        assert_eq!(agent.statistics().episodes, 0);
        assert_eq!(agent.statistics().updates, 0);
    }
}

#[test]
fn test_play_only_agents_need_no_learning_parameters() {
    let params = AgentParams::new()
        .with_trainable(false)
        .with_number(keys::SEED, 3.0);
    let kinds = [
        AgentKind::SimpleQL,
        AgentKind::DoubleQL,
        AgentKind::DynaQL,
        AgentKind::SarsaLambda,
    ];
    for kind in kinds {
        let mut agent = create_agent(kind, &params, A).unwrap();
        assert_eq!(agent.mode(), AgentMode::Inference, "{}", kind);

        agent.set_mode(AgentMode::Training);
        assert_eq!(agent.mode(), AgentMode::Inference, "{}", kind);

        let mut opponent = RandomAgent::with_seed(3);
        for _ in 0..5 {
            play_game(&small_settings(), agent.as_mut(), &mut opponent).unwrap();
        }
        assert_eq!(agent.statistics().episodes, 0, "{}", kind);
        assert_eq!(agent.statistics().updates, 0, "{}", kind);

        agent.set_mode(AgentMode::SemiGreedy);
        assert_eq!(agent.mode(), AgentMode::SemiGreedy, "{}", kind);
    }
}

#[test]
fn test_play_only_agents_still_check_supplied_parameters() {
    let params = AgentParams::new()
        .with_trainable(false)
        .with_text(keys::COMBINE_QTABLES, "median");
    assert!(matches!(
        DoubleQAgent::new(&params, A),
        Err(NWinsError::InvalidArgument(_))
    ));

    let params = AgentParams::new()
        .with_trainable(false)
        .with_text(keys::EXP_STRATEGY, "boltzmann");
    assert!(matches!(
        QLearningAgent::new(&params, A),
        Err(NWinsError::UnsupportedStrategy(_))
    ));
}

#[test]
fn test_every_kind_trains_on_both_sides() {
    common::init_logger();
    let kinds = [
        AgentKind::SimpleQL,
        AgentKind::DoubleQL,
        AgentKind::DynaQL,
        AgentKind::SarsaLambda,
    ];
    for kind in kinds {
        let mut side_a = create_agent(kind, &full_params(10), A).unwrap();
        let mut side_b = create_agent(kind, &full_params(11), B).unwrap();
        for _ in 0..50 {
            play_game(&small_settings(), side_a.as_mut(), side_b.as_mut()).unwrap();
        }
        for agent in [&side_a, &side_b] {
            let stats = agent.statistics();
            assert_eq!(stats.episodes, 50, "{}", kind);
            assert!(stats.updates > 0);
            assert!(stats.known_states > 0);
            assert!(stats.summary().contains("Episodes: 50"));
        }
    }
}

#[test]
fn test_trained_agent_beats_random_play() {
    let settings = small_settings();
    let mut learner = QLearningAgent::new(&training_params(12), A).unwrap();
    let mut trainer = RandomAgent::with_seed(13);
    for _ in 0..3000 {
        play_game(&settings, &mut learner, &mut trainer).unwrap();
    }

    learner.set_mode(AgentMode::Inference);
    let mut opponent = RandomAgent::with_seed(14);
    let wins = (0..200)
        .filter(|_| {
            let engine = play_game(&settings, &mut learner, &mut opponent).unwrap();
            engine.result() == Some(GameResult::WinSideA)
        })
        .count();
    assert!(wins > 100, "only {} wins out of 200", wins);
}

#[test]
fn test_seeded_agents_are_reproducible() {
    let run = || {
        let mut agent = QLearningAgent::new(&training_params(21), A).unwrap();
        let mut opponent = RandomAgent::with_seed(22);
        (0..20)
            .map(|_| {
                let engine = play_game(&small_settings(), &mut agent, &mut opponent).unwrap();
                engine.history().len()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_board_state_trait_is_usable_on_agent_input() {
    let state = GameState::empty(3, 3).unwrap();
    let mut agent = QLearningAgent::new(&training_params(30), A).unwrap();
    let action = agent.choose_action(&state, None).unwrap();
    assert!(state.possible_actions().contains(&action));
    assert_eq!(agent.table().get(&state).unwrap().len(), 3);
}
