#[macro_use]
extern crate criterion;

use criterion::{black_box, BenchmarkId, Criterion};
use nwins::{
    agent::{QLearningAgent, RandomAgent},
    codec,
    config::{keys, AgentParams},
    state::generic::GenericState,
    Agent, BoardState, GameAction, GameEngine, GameSettings, GameSide, GameState,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

// Random reachable positions halfway through a game
fn sample_states(rows: usize, columns: usize, count: usize) -> Vec<GameState> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..count)
        .map(|_| {
            let mut state = GameState::empty(rows, columns).unwrap();
            for _ in 0..(rows * columns) / 2 {
                let action = *state.possible_actions().choose(&mut rng).unwrap();
                state = state.apply_action(&action).unwrap();
            }
            state
        })
        .collect()
}

fn bench_apply_action(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_action");
    for (rows, columns) in [(6, 7), (8, 8), (13, 5)] {
        let states = sample_states(rows, columns, 64);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", rows, columns)),
            &states,
            |b, states| {
                b.iter(|| {
                    for state in states {
                        for action in state.possible_actions() {
                            black_box(state.apply_action(&action).unwrap());
                        }
                    }
                })
            },
        );
    }
    group.finish();
}

fn bench_connect_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_connect_n");
    let packed = sample_states(6, 7, 64);
    let generic: Vec<GameState> = packed
        .iter()
        .map(|state| GameState::from(GenericState::from_cells(6, 7, &state.cells()).unwrap()))
        .collect();

    group.bench_function("packed 6x7", |b| {
        b.iter(|| {
            for state in &packed {
                black_box(state.is_connect_n(4));
            }
        })
    });
    group.bench_function("generic 6x7", |b| {
        b.iter(|| {
            for state in &generic {
                black_box(state.is_connect_n(4));
            }
        })
    });
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let states = sample_states(6, 7, 64);
    let hashes: Vec<String> = states.iter().map(|s| s.to_hash().unwrap()).collect();

    c.bench_function("encode 6x7", |b| {
        b.iter(|| {
            for state in &states {
                black_box(codec::to_hash(state).unwrap());
            }
        })
    });
    c.bench_function("decode 6x7", |b| {
        b.iter(|| {
            for hash in &hashes {
                black_box(GameState::from_hash(hash).unwrap());
            }
        })
    });
}

fn play(settings: &GameSettings, learner: &mut QLearningAgent, opponent: &mut RandomAgent) {
    let mut engine = GameEngine::new(settings.clone()).unwrap();
    let mut last: Option<GameAction> = None;
    while !engine.is_terminal() {
        let state = engine.current_state().clone();
        let action = match engine.acting_side() {
            GameSide::SideA => learner.choose_action(&state, last).unwrap(),
            _ => opponent.choose_action(&state, last).unwrap(),
        };
        engine.apply_action(action).unwrap();
        last = Some(action);
    }
    learner.on_game_over(&engine, last).unwrap();
}

fn bench_self_play_learning(c: &mut Criterion) {
    let settings = GameSettings::default();
    let params = AgentParams::new()
        .with_number(keys::ALPHA, 0.1)
        .with_number(keys::GAMMA, 0.9)
        .with_text(keys::EXP_STRATEGY, "epsilon_greedy_lindecay")
        .with_number(keys::START_EPSILON, 1.0)
        .with_number(keys::MIN_EPSILON, 0.1)
        .with_number(keys::DECAY_EPISODES, 1000.0)
        .with_number(keys::SEED, 1.0);

    c.bench_function("q-learning 100 games 4x5", |b| {
        b.iter(|| {
            let mut learner = QLearningAgent::new(&params, GameSide::SideA).unwrap();
            let mut opponent = RandomAgent::with_seed(2);
            for _ in 0..100 {
                play(&settings, &mut learner, &mut opponent);
            }
            black_box(learner.table().len())
        })
    });
}

criterion_group!(
    benches,
    bench_apply_action,
    bench_connect_detection,
    bench_codec,
    bench_self_play_learning
);
criterion_main!(benches);
