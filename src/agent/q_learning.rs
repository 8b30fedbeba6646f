//! Naive Q-learning

use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;

use super::{
    agent_rng, learning_rates, missing_values, Agent, AgentMode, StrategySet, TrainableAgent,
};
use crate::{
    action::{GameAction, GameSide},
    config::AgentParams,
    engine::{ActionLog, GameSummary},
    q_table::QTable,
    state::GameState,
    stats::LearningStatistics,
    storage,
    utils::{max_value, td_target, td_update},
    Result,
};

/// Single-table Q-learning agent
///
/// The logged new state of a move does not contain the opponent's reply yet,
/// so the bootstrap term is the best value over every state the opponent can
/// reach from it with one legal action. Terminal moves do not bootstrap.
///
/// Required parameters: `alpha`, `gamma` and the training strategy's keys.
#[derive(Debug)]
pub struct QLearningAgent {
    side: GameSide,
    alpha: f64,
    gamma: f64,
    table: QTable,
    strategies: StrategySet,
    rng: StdRng,
    stats: LearningStatistics,
}

impl QLearningAgent {
    /// Creates an agent with an empty table
    pub fn new(params: &AgentParams, side: GameSide) -> Result<Self> {
        let (alpha, gamma) = learning_rates(params)?;
        let mut rng = agent_rng(params)?;
        let strategies = StrategySet::new(params, &mut rng)?;

        info!(
            "simple Q-learning agent: side={}, alpha={}, gamma={}, strategy={}",
            side,
            alpha,
            gamma,
            strategies.training_name()
        );

        Ok(QLearningAgent {
            side,
            alpha,
            gamma,
            table: QTable::new(),
            strategies,
            rng,
            stats: LearningStatistics::new(),
        })
    }

    /// Returns the learned table
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Best value over all states the opponent can produce from `log.new_state`
    fn opponent_reply_bootstrap(&mut self, log: &ActionLog) -> Result<f64> {
        if log.is_terminal {
            return Ok(0.0);
        }
        let mut best: Option<f64> = None;
        for reply in log.new_state.successors()? {
            self.table.ensure_initialized(&reply, &mut self.rng);
            if let Some(value) = self.table.get(&reply).and_then(max_value) {
                best = Some(best.map_or(value, |b| b.max(value)));
            }
        }
        Ok(best.unwrap_or(0.0))
    }

    fn update(&mut self, log: &ActionLog) -> Result<()> {
        self.table.ensure_initialized(&log.old_state, &mut self.rng);
        let bootstrap = self.opponent_reply_bootstrap(log)?;

        let current = self.table.value(&log.old_state, &log.action).unwrap_or(0.0);
        let target = td_target(log.reward, self.gamma, bootstrap);
        self.table
            .set_value(&log.old_state, log.action, td_update(current, self.alpha, target));
        self.stats.updates += 1;
        Ok(())
    }
}

impl Agent for QLearningAgent {
    fn choose_action(
        &mut self,
        state: &GameState,
        _opponent_action: Option<GameAction>,
    ) -> Result<GameAction> {
        self.table.ensure_initialized(state, &mut self.rng);
        let ratings = self.table.get(state).ok_or_else(|| missing_values(state))?;
        self.strategies.current().choose_action(ratings)
    }

    fn on_game_over(
        &mut self,
        summary: &dyn GameSummary,
        _opponent_action: Option<GameAction>,
    ) -> Result<()> {
        if !self.strategies.is_training() {
            return Ok(());
        }
        let start = Instant::now();

        let logs = summary.actions_of(self.side);
        for log in &logs {
            self.update(log)?;
        }
        self.strategies.training().on_episode_end(summary);

        self.stats.episodes += 1;
        self.stats.known_states = self.table.len();
        self.stats.total_time += start.elapsed();
        debug!(
            "episode {}: {} updates, {} known states",
            self.stats.episodes,
            logs.len(),
            self.stats.known_states
        );
        Ok(())
    }
}

impl TrainableAgent for QLearningAgent {
    fn set_mode(&mut self, mode: AgentMode) {
        self.strategies.set_mode(mode);
    }

    fn mode(&self) -> AgentMode {
        self.strategies.mode()
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        self.table = storage::read_q_table(path)?;
        self.stats.known_states = self.table.len();
        Ok(())
    }

    fn store_model(&self, path: &Path) -> Result<()> {
        storage::write_q_table(&self.table, path)
    }

    fn statistics(&self) -> &LearningStatistics {
        &self.stats
    }
}
