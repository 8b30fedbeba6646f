//! SARSA(λ) with accumulating eligibility traces

use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;

use super::{
    agent_rng, learning_number, learning_rates, missing_values, next_state, Agent, AgentMode,
    StrategySet, TrainableAgent,
};
use crate::{
    action::{GameAction, GameSide},
    config::{keys, AgentParams},
    engine::{ActionLog, GameSummary},
    q_table::QTable,
    state::{BoardState, GameState},
    stats::LearningStatistics,
    storage,
    utils::td_target,
    Result,
};

/// On-policy agent learning with SARSA(λ)
///
/// The bootstrap action is sampled from the training strategy instead of
/// taken greedily. Traces live for one game only: every pair that was visited
/// in the game is adjusted by `α·δ·e` after each move, and its trace decays by
/// `γ·λ`.
///
/// Required parameters: `alpha`, `gamma`, `lambda` and the training
/// strategy's keys.
#[derive(Debug)]
pub struct SarsaLambdaAgent {
    side: GameSide,
    alpha: f64,
    gamma: f64,
    lambda: f64,
    table: QTable,
    strategies: StrategySet,
    rng: StdRng,
    stats: LearningStatistics,
}

impl SarsaLambdaAgent {
    /// Creates an agent with an empty table
    pub fn new(params: &AgentParams, side: GameSide) -> Result<Self> {
        let (alpha, gamma) = learning_rates(params)?;
        let lambda = learning_number(params, keys::LAMBDA, 0.0)?;
        let mut rng = agent_rng(params)?;
        let strategies = StrategySet::new(params, &mut rng)?;

        info!(
            "SARSA(lambda) agent: side={}, alpha={}, gamma={}, lambda={}, strategy={}",
            side,
            alpha,
            gamma,
            lambda,
            strategies.training_name()
        );

        Ok(SarsaLambdaAgent {
            side,
            alpha,
            gamma,
            lambda,
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

    /// Value of the action the training strategy picks in `next`
    ///
    /// States without legal actions are worth nothing.
    fn on_policy_value(&mut self, next: &GameState) -> Result<f64> {
        if next.possible_actions().is_empty() {
            return Ok(0.0);
        }
        self.table.ensure_initialized(next, &mut self.rng);
        let ratings = self.table.get(next).ok_or_else(|| missing_values(next))?;
        let action = self.strategies.training().choose_action(ratings)?;
        Ok(ratings.get(&action).copied().unwrap_or(0.0))
    }

    fn update(&mut self, log: &ActionLog, next: &GameState, traces: &mut QTable) -> Result<()> {
        self.table.ensure_initialized(&log.old_state, &mut self.rng);
        traces.ensure_zeroed(&log.old_state);

        let bootstrap = self.on_policy_value(next)?;
        let current = self.table.value(&log.old_state, &log.action).unwrap_or(0.0);
        let delta = td_target(log.reward, self.gamma, bootstrap) - current;

        let trace = traces.value(&log.old_state, &log.action).unwrap_or(0.0);
        traces.set_value(&log.old_state, log.action, trace + 1.0);

        let decay = self.gamma * self.lambda;
        for (state, state_traces) in traces.iter_mut() {
            let Some(values) = self.table.get_mut(state) else {
                continue;
            };
            for (action, eligibility) in state_traces.iter_mut() {
                if *eligibility == 0.0 {
                    continue;
                }
                if let Some(value) = values.get_mut(action) {
                    *value += self.alpha * delta * *eligibility;
                }
                *eligibility *= decay;
            }
        }
        self.stats.updates += 1;
        Ok(())
    }
}

impl Agent for SarsaLambdaAgent {
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

        let mut traces = QTable::new();
        let logs = summary.actions_of(self.side);
        for (index, log) in logs.iter().enumerate() {
            self.update(log, next_state(&logs, index), &mut traces)?;
        }
        self.strategies.training().on_episode_end(summary);

        self.stats.episodes += 1;
        self.stats.known_states = self.table.len();
        self.stats.total_time += start.elapsed();
        debug!(
            "episode {}: {} updates, {} traced states, {} known states",
            self.stats.episodes,
            logs.len(),
            traces.len(),
            self.stats.known_states
        );
        Ok(())
    }
}

impl TrainableAgent for SarsaLambdaAgent {
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
