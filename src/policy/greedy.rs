//! Inference strategies

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{check_probability, ExplorationStrategy, GREEDY_INFERENCE, SEMI_GREEDY_INFERENCE};
use crate::{
    action::GameAction,
    q_table::ActionValues,
    utils::{argmax, ranked},
    NWinsError, Result,
};

/// Always plays the best-rated action
///
/// Equal ratings resolve to the lowest column.
#[derive(Debug, Clone, Default)]
pub struct Greedy;

impl Greedy {
    /// Creates a greedy strategy
    pub fn new() -> Self {
        Greedy
    }
}

impl ExplorationStrategy for Greedy {
    fn choose_action(&mut self, ratings: &ActionValues) -> Result<GameAction> {
        argmax(ratings)
            .map(|(action, _)| action)
            .ok_or(NWinsError::EmptyRatings)
    }

    fn name(&self) -> &'static str {
        GREEDY_INFERENCE
    }
}

/// Plays the best-rated action, or with probability epsilon the second best
///
/// With a single candidate that candidate is always returned.
#[derive(Debug, Clone)]
pub struct SemiGreedy {
    epsilon: f64,
    rng: StdRng,
}

impl SemiGreedy {
    /// Creates a semi-greedy strategy
    ///
    /// Fails with [`NWinsError::InvalidArgument`] unless `epsilon` is in `[0, 1]`.
    pub fn new(epsilon: f64) -> Result<Self> {
        check_probability("semi-greedy epsilon", epsilon)?;
        Ok(SemiGreedy {
            epsilon,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseeds the random number generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the probability of playing the runner-up
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl ExplorationStrategy for SemiGreedy {
    fn choose_action(&mut self, ratings: &ActionValues) -> Result<GameAction> {
        let ranking = ranked(ratings);
        match ranking.as_slice() {
            [] => Err(NWinsError::EmptyRatings),
            [(only, _)] => Ok(*only),
            [(best, _), (second, _), ..] => {
                if self.rng.gen::<f64>() < self.epsilon {
                    Ok(*second)
                } else {
                    Ok(*best)
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        SEMI_GREEDY_INFERENCE
    }
}
