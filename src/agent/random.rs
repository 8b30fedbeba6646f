//! Uniformly random baseline agent

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::{Agent, AgentMode, TrainableAgent};
use crate::{
    action::GameAction,
    engine::GameSummary,
    state::{BoardState, GameState},
    stats::LearningStatistics,
    NWinsError, Result,
};

/// Picks uniformly among the legal actions and never learns
///
/// The mode is recorded but has no effect; loading and storing a model are
/// no-ops.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
    mode: AgentMode,
    stats: LearningStatistics,
}

impl RandomAgent {
    /// Creates an agent seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates an agent with a reproducible sequence of moves
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        RandomAgent {
            rng,
            mode: AgentMode::default(),
            stats: LearningStatistics::new(),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn choose_action(
        &mut self,
        state: &GameState,
        _opponent_action: Option<GameAction>,
    ) -> Result<GameAction> {
        state
            .possible_actions()
            .choose(&mut self.rng)
            .copied()
            .ok_or(NWinsError::NoLegalActions)
    }

    fn on_game_over(
        &mut self,
        _summary: &dyn GameSummary,
        _opponent_action: Option<GameAction>,
    ) -> Result<()> {
        Ok(())
    }
}

impl TrainableAgent for RandomAgent {
    fn set_mode(&mut self, mode: AgentMode) {
        self.mode = mode;
    }

    fn mode(&self) -> AgentMode {
        self.mode
    }

    fn load_model(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn store_model(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn statistics(&self) -> &LearningStatistics {
        &self.stats
    }
}
