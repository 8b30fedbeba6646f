//! # nwins
//!
//! A generalized "connect-N" board game together with a family of tabular
//! reinforcement learning agents that learn to play it.
//!
//! The board has a configurable number of rows and columns, stones drop to the
//! lowest free row of a column, and a side wins by connecting a configurable
//! number of stones horizontally, vertically or diagonally.
//!
//! ## Features
//!
//! - Two interchangeable state representations behind one [`GameState`] type: a
//!   bit-packed one for boards with at most 64 cells and a generic cell array for
//!   larger boards
//! - A compact binary codec with a Base64 text form used as state identity in
//!   model files
//! - A [`GameEngine`] that records every move and shapes rewards (win, tie, nothing)
//! - Pluggable exploration strategies shared by all learning agents
//! - Naive Q-learning, double Q-learning, Dyna-Q and SARSA(λ) agents plus a
//!   random baseline
//! - Text persistence for Q-tables and experience replay buffers
//!
//! ## Basic Usage
//!
//! ```
//! use nwins::{
//!     agent::{Agent, QLearningAgent, RandomAgent, TrainableAgent},
//!     config::{keys, AgentParams},
//!     GameEngine, GameSettings, GameSide,
//! };
//!
//! fn main() -> Result<(), nwins::NWinsError> {
//!     let settings = GameSettings::default()
//!         .with_rows(4)
//!         .with_columns(5)
//!         .with_stones_to_connect(4);
//!
//!     let params = AgentParams::new()
//!         .with_number(keys::ALPHA, 0.1)
//!         .with_number(keys::GAMMA, 0.9)
//!         .with_text(keys::EXP_STRATEGY, "epsilon_greedy_lindecay")
//!         .with_number(keys::START_EPSILON, 1.0)
//!         .with_number(keys::MIN_EPSILON, 0.1)
//!         .with_number(keys::DECAY_EPISODES, 100.0)
//!         .with_number(keys::SEED, 7.0);
//!
//!     let mut learner = QLearningAgent::new(&params, GameSide::SideA)?;
//!     let mut opponent = RandomAgent::with_seed(11);
//!
//!     for _ in 0..10 {
//!         let mut engine = GameEngine::new(settings.clone())?;
//!         let mut last_action = None;
//!         while !engine.is_terminal() {
//!             let state = engine.current_state().clone();
//!             let action = match engine.acting_side() {
//!                 GameSide::SideA => learner.choose_action(&state, last_action)?,
//!                 _ => opponent.choose_action(&state, last_action)?,
//!             };
//!             engine.apply_action(action)?;
//!             last_action = Some(action);
//!         }
//!         learner.on_game_over(&engine, last_action)?;
//!     }
//!
//!     println!("{}", learner.statistics().summary());
//!     Ok(())
//! }
//! ```
//!
//! ## How Learning Works
//!
//! An outer loop asks an agent for an action, applies it through the
//! [`GameEngine`] and, once the game is over, hands the engine (which implements
//! [`GameSummary`]) to the agent's learning hook. The agent walks its own side's
//! [`ActionLog`] entries and updates its Q-table with the rule of its algorithm.
//!
//! States that the agent has never seen are seeded explicitly with one random
//! value per legal action ([`QTable::ensure_initialized`]) before any lookup.

pub mod action;
pub mod agent;
pub mod codec;
pub mod config;
pub mod engine;
pub mod policy;
pub mod q_table;
pub mod replay;
pub mod state;
pub mod stats;
pub mod storage;
pub mod utils;

pub use action::{GameAction, GameResult, GameSide};
pub use agent::{Agent, AgentMode, TrainableAgent};
pub use config::{AgentKind, AgentParams, GameSettings};
pub use engine::{ActionLog, GameEngine, GameSummary};
pub use policy::ExplorationStrategy;
pub use q_table::{ActionValues, QTable};
pub use replay::ReplayBuffer;
pub use state::{BoardState, GameState};
pub use stats::LearningStatistics;

/// Error types for the game engine and the learning agents
#[derive(thiserror::Error, Debug)]
pub enum NWinsError {
    /// The action is not legal in the given state
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A constructor or function argument is out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required hyper-parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// The requested exploration strategy does not exist
    #[error("Unsupported exploration strategy: {0}")]
    UnsupportedStrategy(String),

    /// A state hash string or blob could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// An exploration strategy was asked to pick from zero actions
    #[error("Action ratings must not be empty")]
    EmptyRatings,

    /// No legal actions are available from the current state
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// A line of a persisted model or replay buffer could not be parsed
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// One-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// Reading or writing a file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for game and agent operations
pub type Result<T> = std::result::Result<T, NWinsError>;
