//! Dyna-Q: Q-learning plus planning from replayed experience

use std::path::Path;
use std::time::Instant;

use log::{debug, info, trace};
use rand::rngs::StdRng;

use super::{
    agent_rng, learning_count, learning_rates, missing_values, next_state, Agent, AgentMode,
    StrategySet, TrainableAgent,
};
use crate::{
    action::{GameAction, GameSide},
    config::{keys, AgentParams},
    engine::{ActionLog, GameSummary},
    q_table::QTable,
    replay::ReplayBuffer,
    state::GameState,
    stats::LearningStatistics,
    storage,
    utils::{max_value, td_target, td_update},
    Result,
};

/// Q-learning agent with an experience replay buffer
///
/// Every real move is learned from once, with the start state of the agent's
/// next move as the next state, and then remembered. When the buffer holds at
/// least `dynaq_min_memory` moves, each game ends with `dynaq_steps` extra
/// updates on moves sampled uniformly from the buffer.
///
/// Required parameters: `alpha`, `gamma`, `dynaq_memory_size`, `dynaq_steps`,
/// `dynaq_min_memory` and the training strategy's keys, unless the
/// parameters are play-only.
#[derive(Debug)]
pub struct DynaQAgent {
    side: GameSide,
    alpha: f64,
    gamma: f64,
    planning_steps: usize,
    min_memory: usize,
    table: QTable,
    memory: ReplayBuffer<ActionLog>,
    strategies: StrategySet,
    rng: StdRng,
    stats: LearningStatistics,
}

impl DynaQAgent {
    /// Creates an agent with an empty table and an empty buffer
    pub fn new(params: &AgentParams, side: GameSide) -> Result<Self> {
        let (alpha, gamma) = learning_rates(params)?;
        let memory_size = learning_count(params, keys::DYNAQ_MEMORY_SIZE, 1)?;
        let planning_steps = learning_count(params, keys::DYNAQ_STEPS, 0)?;
        let min_memory = learning_count(params, keys::DYNAQ_MIN_MEMORY, 0)?;
        let memory = ReplayBuffer::new(memory_size)?;
        let mut rng = agent_rng(params)?;
        let strategies = StrategySet::new(params, &mut rng)?;

        info!(
            "Dyna-Q agent: side={}, alpha={}, gamma={}, memory={}, steps={}, min memory={}, strategy={}",
            side,
            alpha,
            gamma,
            memory_size,
            planning_steps,
            min_memory,
            strategies.training_name()
        );

        Ok(DynaQAgent {
            side,
            alpha,
            gamma,
            planning_steps,
            min_memory,
            table: QTable::new(),
            memory,
            strategies,
            rng,
            stats: LearningStatistics::new(),
        })
    }

    /// Returns the learned table
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Returns the remembered moves
    pub fn memory(&self) -> &ReplayBuffer<ActionLog> {
        &self.memory
    }

    /// Writes the replay buffer to `path`
    pub fn store_replay_buffer(&self, path: &Path) -> Result<()> {
        storage::write_replay_buffer(&self.memory, path)
    }

    /// Replaces the replay buffer with the one stored at `path`
    ///
    /// The configured capacity is kept; surplus old entries are dropped.
    pub fn load_replay_buffer(&mut self, path: &Path) -> Result<()> {
        self.memory = storage::read_replay_buffer(path, self.memory.capacity())?;
        Ok(())
    }

    /// One Q-learning step on `log`, bootstrapping from `log.new_state`
    fn update(&mut self, log: &ActionLog) {
        self.table.ensure_initialized(&log.old_state, &mut self.rng);
        self.table.ensure_initialized(&log.new_state, &mut self.rng);

        let bootstrap = if log.is_terminal {
            0.0
        } else {
            self.table
                .get(&log.new_state)
                .and_then(max_value)
                .unwrap_or(0.0)
        };

        let current = self.table.value(&log.old_state, &log.action).unwrap_or(0.0);
        let target = td_target(log.reward, self.gamma, bootstrap);
        self.table
            .set_value(&log.old_state, log.action, td_update(current, self.alpha, target));
    }

    fn plan(&mut self) {
        if self.memory.len() < self.min_memory {
            return;
        }
        let batch: Vec<ActionLog> = self
            .memory
            .rand_batch(self.planning_steps, &mut self.rng)
            .into_iter()
            .cloned()
            .collect();
        trace!("planning with {} replayed moves", batch.len());
        for log in &batch {
            self.update(log);
        }
        self.stats.planning_updates += batch.len();
    }
}

impl Agent for DynaQAgent {
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
        for (index, log) in logs.iter().enumerate() {
            let experience = ActionLog::new(
                log.old_state.clone(),
                next_state(&logs, index).clone(),
                log.action,
                log.reward,
                log.is_terminal,
            );
            self.update(&experience);
            self.stats.updates += 1;
            self.memory.push(experience);
        }
        self.plan();
        self.strategies.training().on_episode_end(summary);

        self.stats.episodes += 1;
        self.stats.known_states = self.table.len();
        self.stats.total_time += start.elapsed();
        debug!(
            "episode {}: {} updates, {} remembered moves, {} known states",
            self.stats.episodes,
            logs.len(),
            self.memory.len(),
            self.stats.known_states
        );
        Ok(())
    }
}

impl TrainableAgent for DynaQAgent {
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
