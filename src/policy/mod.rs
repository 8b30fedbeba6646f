//! Exploration strategies
//!
//! An [`ExplorationStrategy`] turns the action values of one state into a
//! concrete action. Agents hold three of them and switch between them with
//! their [`AgentMode`](crate::agent::AgentMode):
//! - [`LinearDecayEpsilonGreedy`]: exploration while training
//! - [`Greedy`]: pure exploitation for inference
//! - [`SemiGreedy`]: inference that occasionally plays the runner-up

pub mod epsilon;
pub mod greedy;

pub use epsilon::LinearDecayEpsilonGreedy;
pub use greedy::{Greedy, SemiGreedy};

use std::fmt;

use crate::{
    action::GameAction,
    config::{keys, AgentParams},
    engine::GameSummary,
    q_table::ActionValues,
    NWinsError, Result,
};

/// Name of the linearly decaying epsilon-greedy strategy
pub const EPSILON_GREEDY_LINDECAY: &str = "epsilon_greedy_lindecay";
/// Name of the greedy strategy
pub const GREEDY_INFERENCE: &str = "greedy_inference";
/// Name of the semi-greedy strategy
pub const SEMI_GREEDY_INFERENCE: &str = "semi_greedy_inference";

/// Trait for strategies that pick an action from rated candidates
pub trait ExplorationStrategy: fmt::Debug + Send {
    /// Picks one of the rated actions
    ///
    /// Fails with [`NWinsError::EmptyRatings`] when `ratings` is empty.
    fn choose_action(&mut self, ratings: &ActionValues) -> Result<GameAction>;

    /// Called once per finished training game
    fn on_episode_end(&mut self, _summary: &dyn GameSummary) {}

    /// Returns the strategy's registered name
    fn name(&self) -> &'static str;
}

/// Builds the strategy named by the `exp_strategy` parameter
///
/// `seed` fixes the strategy's random number generator; `None` seeds it from
/// OS entropy.
pub fn create_strategy(
    params: &AgentParams,
    seed: Option<u64>,
) -> Result<Box<dyn ExplorationStrategy>> {
    let name = params.text(keys::EXP_STRATEGY)?;
    let strategy: Box<dyn ExplorationStrategy> = match name {
        EPSILON_GREEDY_LINDECAY => {
            let min_epsilon = params.number(keys::MIN_EPSILON)?;
            let start_epsilon = params.number(keys::START_EPSILON)?;
            let decay_episodes = params.integer(keys::DECAY_EPISODES)?;
            let strategy =
                LinearDecayEpsilonGreedy::new(min_epsilon, start_epsilon, decay_episodes, 0)?;
            match seed {
                Some(seed) => Box::new(strategy.with_seed(seed)),
                None => Box::new(strategy),
            }
        }
        GREEDY_INFERENCE => Box::new(Greedy::new()),
        SEMI_GREEDY_INFERENCE => {
            let strategy = SemiGreedy::new(params.number(keys::SEMI_GREEDY_EPSILON)?)?;
            match seed {
                Some(seed) => Box::new(strategy.with_seed(seed)),
                None => Box::new(strategy),
            }
        }
        other => return Err(NWinsError::UnsupportedStrategy(other.to_string())),
    };
    Ok(strategy)
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(NWinsError::InvalidArgument(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
