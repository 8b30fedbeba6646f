//! Epsilon-greedy exploration with a linearly decaying epsilon

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{check_probability, ExplorationStrategy, EPSILON_GREEDY_LINDECAY};
use crate::{
    action::GameAction, engine::GameSummary, q_table::ActionValues, utils::argmax, NWinsError,
    Result,
};

/// Epsilon-greedy strategy whose epsilon falls linearly per episode
///
/// Epsilon starts at `start_epsilon`, reaches `min_epsilon` after
/// `decay_episodes` episodes and stays there. Exploring picks uniformly among
/// all candidates, the greedy one included.
///
/// # Example
///
/// ```
/// use nwins::policy::LinearDecayEpsilonGreedy;
///
/// let strategy = LinearDecayEpsilonGreedy::new(0.1, 0.9, 100, 50).unwrap();
/// assert!((strategy.epsilon() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearDecayEpsilonGreedy {
    min_epsilon: f64,
    start_epsilon: f64,
    decay_episodes: u64,
    episode: u64,
    rng: StdRng,
}

impl LinearDecayEpsilonGreedy {
    /// Creates the strategy at the given episode
    ///
    /// Fails with [`NWinsError::InvalidArgument`] when an epsilon lies outside
    /// `[0, 1]`, `min_epsilon > start_epsilon`, or a count is negative.
    pub fn new(
        min_epsilon: f64,
        start_epsilon: f64,
        decay_episodes: i64,
        episode: i64,
    ) -> Result<Self> {
        check_probability("min epsilon", min_epsilon)?;
        check_probability("start epsilon", start_epsilon)?;
        if min_epsilon > start_epsilon {
            return Err(NWinsError::InvalidArgument(format!(
                "min epsilon {} exceeds start epsilon {}",
                min_epsilon, start_epsilon
            )));
        }
        if decay_episodes < 0 {
            return Err(NWinsError::InvalidArgument(format!(
                "decay episodes must not be negative, got {}",
                decay_episodes
            )));
        }
        if episode < 0 {
            return Err(NWinsError::InvalidArgument(format!(
                "episode must not be negative, got {}",
                episode
            )));
        }

        Ok(LinearDecayEpsilonGreedy {
            min_epsilon,
            start_epsilon,
            decay_episodes: decay_episodes as u64,
            episode: episode as u64,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseeds the random number generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the number of finished episodes
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Returns the exploration probability of the current episode
    pub fn epsilon(&self) -> f64 {
        let remaining = if self.episode < self.decay_episodes {
            1.0 - self.episode as f64 / self.decay_episodes as f64
        } else {
            0.0
        };
        self.min_epsilon + remaining * (self.start_epsilon - self.min_epsilon)
    }
}

impl ExplorationStrategy for LinearDecayEpsilonGreedy {
    fn choose_action(&mut self, ratings: &ActionValues) -> Result<GameAction> {
        let (greedy, _) = argmax(ratings).ok_or(NWinsError::EmptyRatings)?;

        if self.rng.gen::<f64>() >= self.epsilon() {
            return Ok(greedy);
        }

        let index = self.rng.gen_range(0..ratings.len());
        Ok(ratings.keys().nth(index).copied().unwrap_or(greedy))
    }

    fn on_episode_end(&mut self, _summary: &dyn GameSummary) {
        self.episode += 1;
    }

    fn name(&self) -> &'static str {
        EPSILON_GREEDY_LINDECAY
    }
}
