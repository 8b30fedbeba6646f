//! Game-playing agents
//!
//! Every agent implements [`Agent`]; the learning ones (and the random
//! baseline, so that all kinds can be handled uniformly) also implement
//! [`TrainableAgent`]. Use [`create_agent`] to build one from an
//! [`AgentKind`] and an [`AgentParams`] map.
//!
//! Learning happens in [`Agent::on_game_over`] and only in
//! [`AgentMode::Training`]. The agent walks the log entries of its own side
//! and applies the update rule of its algorithm.
//!
//! Parameters marked with [`AgentParams::with_trainable`]`(false)` build
//! play-only agents: they start in [`AgentMode::Inference`], never learn, and
//! only need a model to play well.

pub mod double_q;
pub mod dyna_q;
pub mod q_learning;
pub mod random;
pub mod sarsa;

pub use double_q::DoubleQAgent;
pub use dyna_q::DynaQAgent;
pub use q_learning::QLearningAgent;
pub use random::RandomAgent;
pub use sarsa::SarsaLambdaAgent;

use std::fmt;
use std::path::Path;

use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    action::{GameAction, GameSide},
    config::{keys, AgentKind, AgentParams},
    engine::{ActionLog, GameSummary},
    policy::{self, ExplorationStrategy, Greedy, SemiGreedy},
    state::GameState,
    stats::LearningStatistics,
    NWinsError, Result,
};

/// Which exploration strategy an agent acts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentMode {
    /// Configured training strategy, learning enabled
    #[default]
    Training,
    /// Greedy play, learning disabled
    Inference,
    /// Semi-greedy play, learning disabled
    SemiGreedy,
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentMode::Training => write!(f, "training"),
            AgentMode::Inference => write!(f, "inference"),
            AgentMode::SemiGreedy => write!(f, "semi-greedy"),
        }
    }
}

/// Trait for anything that can play one side of a game
pub trait Agent: Send {
    /// Picks the next action for `state`
    ///
    /// `opponent_action` is the move the opponent just made, if any.
    fn choose_action(
        &mut self,
        state: &GameState,
        opponent_action: Option<GameAction>,
    ) -> Result<GameAction>;

    /// Called once the game is over
    fn on_game_over(
        &mut self,
        summary: &dyn GameSummary,
        opponent_action: Option<GameAction>,
    ) -> Result<()>;
}

/// An agent with a persistent model and selectable play mode
pub trait TrainableAgent: Agent {
    /// Switches the strategy used by [`Agent::choose_action`]
    fn set_mode(&mut self, mode: AgentMode);

    /// Returns the current mode
    fn mode(&self) -> AgentMode;

    /// Replaces the model with the one stored at `path`
    fn load_model(&mut self, path: &Path) -> Result<()>;

    /// Writes the model to `path`
    fn store_model(&self, path: &Path) -> Result<()>;

    /// Returns what the agent has learned so far
    fn statistics(&self) -> &LearningStatistics;
}

/// Builds an agent of the given kind for one side
///
/// Fails with [`NWinsError::MissingParameter`] when a hyper-parameter the
/// algorithm needs is absent. Play-only parameters need none of them.
pub fn create_agent(
    kind: AgentKind,
    params: &AgentParams,
    side: GameSide,
) -> Result<Box<dyn TrainableAgent>> {
    let agent: Box<dyn TrainableAgent> = match kind {
        AgentKind::Random => Box::new(match params.seed()? {
            Some(seed) => RandomAgent::with_seed(seed),
            None => RandomAgent::new(),
        }),
        AgentKind::SimpleQL => Box::new(QLearningAgent::new(params, side)?),
        AgentKind::DoubleQL => Box::new(DoubleQAgent::new(params, side)?),
        AgentKind::DynaQL => Box::new(DynaQAgent::new(params, side)?),
        AgentKind::SarsaLambda => Box::new(SarsaLambdaAgent::new(params, side)?),
    };
    Ok(agent)
}

/// Builds an agent and loads `model` into it when that file exists
pub fn create_agent_with_model(
    kind: AgentKind,
    params: &AgentParams,
    side: GameSide,
    model: &Path,
) -> Result<Box<dyn TrainableAgent>> {
    let mut agent = create_agent(kind, params, side)?;
    if model.is_file() {
        info!("loading startup model {} for {}", model.display(), side);
        agent.load_model(model)?;
    }
    Ok(agent)
}

/// Creates the agent's own generator from the optional `seed` parameter
pub(crate) fn agent_rng(params: &AgentParams) -> Result<StdRng> {
    Ok(match params.seed()? {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    })
}

/// Reads the learning rate and discount factor every learning agent needs
pub(crate) fn learning_rates(params: &AgentParams) -> Result<(f64, f64)> {
    Ok((
        learning_number(params, keys::ALPHA, 0.0)?,
        learning_number(params, keys::GAMMA, 0.0)?,
    ))
}

/// Reads a learning hyper-parameter; play-only agents fall back to `default`
pub(crate) fn learning_number(params: &AgentParams, key: &str, default: f64) -> Result<f64> {
    if params.is_trainable() {
        params.number(key)
    } else {
        params.number_or(key, default)
    }
}

/// Whole-number variant of [`learning_number`]
pub(crate) fn learning_count(params: &AgentParams, key: &str, default: usize) -> Result<usize> {
    if params.is_trainable() || params.contains(key) {
        params.count(key)
    } else {
        Ok(default)
    }
}

/// The three strategies of a learning agent and the mode choosing among them
#[derive(Debug)]
pub(crate) struct StrategySet {
    trainable: bool,
    mode: AgentMode,
    training: Box<dyn ExplorationStrategy>,
    greedy: Greedy,
    semi_greedy: SemiGreedy,
}

impl StrategySet {
    /// Seeds every strategy from `rng` so a single agent seed reproduces a run
    ///
    /// Play-only sets start in inference mode and fall back to greedy play when
    /// no training strategy is named.
    pub(crate) fn new(params: &AgentParams, rng: &mut StdRng) -> Result<Self> {
        let trainable = params.is_trainable();
        let training: Box<dyn ExplorationStrategy> =
            if trainable || params.contains(keys::EXP_STRATEGY) {
                policy::create_strategy(params, Some(rng.gen()))?
            } else {
                Box::new(Greedy::new())
            };
        let semi_greedy = SemiGreedy::new(params.number_or(keys::SEMI_GREEDY_EPSILON, 0.0)?)?
            .with_seed(rng.gen());
        Ok(StrategySet {
            trainable,
            mode: if trainable {
                AgentMode::Training
            } else {
                AgentMode::Inference
            },
            training,
            greedy: Greedy::new(),
            semi_greedy,
        })
    }

    pub(crate) fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Play-only sets refuse to switch to training
    pub(crate) fn set_mode(&mut self, mode: AgentMode) {
        if !self.trainable && mode == AgentMode::Training {
            warn!("ignoring switch to training mode for a play-only agent");
            return;
        }
        self.mode = mode;
    }

    pub(crate) fn is_training(&self) -> bool {
        self.trainable && self.mode == AgentMode::Training
    }

    /// The strategy selected by the current mode
    pub(crate) fn current(&mut self) -> &mut dyn ExplorationStrategy {
        match self.mode {
            AgentMode::Training => self.training.as_mut(),
            AgentMode::Inference => &mut self.greedy,
            AgentMode::SemiGreedy => &mut self.semi_greedy,
        }
    }

    /// The configured training strategy, regardless of mode
    pub(crate) fn training(&mut self) -> &mut dyn ExplorationStrategy {
        self.training.as_mut()
    }

    pub(crate) fn training_name(&self) -> &'static str {
        self.training.name()
    }
}

/// State reached after logs[index] and the opponent's reply
///
/// That is the start state of the agent's next move, or the logged new state
/// for the last move of the game.
pub(crate) fn next_state(logs: &[ActionLog], index: usize) -> &GameState {
    match logs.get(index + 1) {
        Some(next) => &next.old_state,
        None => &logs[index].new_state,
    }
}

pub(crate) fn missing_values(state: &GameState) -> NWinsError {
    NWinsError::InvalidArgument(format!("no action values stored for state\n{}", state))
}
