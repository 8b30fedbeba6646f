//! Double Q-learning

use std::path::Path;
use std::time::Instant;

use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng};

use super::{
    agent_rng, learning_rates, next_state, Agent, AgentMode, StrategySet, TrainableAgent,
};
use crate::{
    action::{GameAction, GameSide},
    config::{keys, AgentParams, CombineMode},
    engine::{ActionLog, GameSummary},
    q_table::QTable,
    state::GameState,
    stats::LearningStatistics,
    storage,
    utils::{argmax, td_target, td_update},
    Result,
};

/// Two-table Q-learning agent
///
/// Each update flips a coin to pick the table to update. The picked table
/// selects the best next action and the other table rates it. Actions are
/// chosen from both tables merged per state with the configured
/// [`CombineMode`]; stored models hold the merged table.
///
/// Required parameters: `alpha`, `gamma`, `combine_qtables` (`sum` or `avg`)
/// and the training strategy's keys, unless the parameters are play-only.
#[derive(Debug)]
pub struct DoubleQAgent {
    side: GameSide,
    alpha: f64,
    gamma: f64,
    combine: CombineMode,
    first: QTable,
    second: QTable,
    strategies: StrategySet,
    rng: StdRng,
    stats: LearningStatistics,
}

impl DoubleQAgent {
    /// Creates an agent with two empty tables
    pub fn new(params: &AgentParams, side: GameSide) -> Result<Self> {
        let (alpha, gamma) = learning_rates(params)?;
        let combine = if params.is_trainable() || params.contains(keys::COMBINE_QTABLES) {
            params.text(keys::COMBINE_QTABLES)?.parse::<CombineMode>()?
        } else {
            CombineMode::default()
        };
        let mut rng = agent_rng(params)?;
        let strategies = StrategySet::new(params, &mut rng)?;

        info!(
            "double Q-learning agent: side={}, alpha={}, gamma={}, combine={}, strategy={}",
            side,
            alpha,
            gamma,
            combine,
            strategies.training_name()
        );

        Ok(DoubleQAgent {
            side,
            alpha,
            gamma,
            combine,
            first: QTable::new(),
            second: QTable::new(),
            strategies,
            rng,
            stats: LearningStatistics::new(),
        })
    }

    /// Returns both tables
    pub fn tables(&self) -> (&QTable, &QTable) {
        (&self.first, &self.second)
    }

    /// Returns both tables merged with the configured mode
    pub fn combined_table(&self) -> QTable {
        QTable::combine(&self.first, &self.second, self.combine)
    }

    fn ensure_initialized(&mut self, state: &GameState) {
        self.first.ensure_initialized(state, &mut self.rng);
        self.second.ensure_initialized(state, &mut self.rng);
    }

    fn update(&mut self, log: &ActionLog, next: &GameState) {
        self.ensure_initialized(&log.old_state);
        self.ensure_initialized(next);

        let update_first = self.rng.gen::<f64>() < 0.5;
        let (updated, evaluator) = if update_first {
            (&mut self.first, &self.second)
        } else {
            (&mut self.second, &self.first)
        };

        let bootstrap = if log.is_terminal {
            0.0
        } else {
            updated
                .get(next)
                .and_then(argmax)
                .and_then(|(best, _)| evaluator.value(next, &best))
                .unwrap_or(0.0)
        };

        let current = updated.value(&log.old_state, &log.action).unwrap_or(0.0);
        let target = td_target(log.reward, self.gamma, bootstrap);
        updated.set_value(&log.old_state, log.action, td_update(current, self.alpha, target));
        trace!(
            "updated table {} for {}",
            if update_first { 1 } else { 2 },
            log.action
        );
        self.stats.updates += 1;
    }
}

impl Agent for DoubleQAgent {
    fn choose_action(
        &mut self,
        state: &GameState,
        _opponent_action: Option<GameAction>,
    ) -> Result<GameAction> {
        self.ensure_initialized(state);
        let ratings = QTable::combine_state(&self.first, &self.second, state, self.combine);
        self.strategies.current().choose_action(&ratings)
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
        for (index, log) in logs.iter().enumerate() {
            self.update(log, next_state(&logs, index));
        }
        self.strategies.training().on_episode_end(summary);

        self.stats.episodes += 1;
        self.stats.known_states = self.first.len();
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

impl TrainableAgent for DoubleQAgent {
    fn set_mode(&mut self, mode: AgentMode) {
        self.strategies.set_mode(mode);
    }

    fn mode(&self) -> AgentMode {
        self.strategies.mode()
    }

    /// Loads the stored merged table into both tables
    fn load_model(&mut self, path: &Path) -> Result<()> {
        let table = storage::read_q_table(path)?;
        self.first = table.clone();
        self.second = table;
        self.stats.known_states = self.first.len();
        Ok(())
    }

    fn store_model(&self, path: &Path) -> Result<()> {
        storage::write_q_table(&self.combined_table(), path)
    }

    fn statistics(&self) -> &LearningStatistics {
        &self.stats
    }
}
