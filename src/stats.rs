//! Statistics collection for learning agents
//!
//! This module provides a structure for collecting and reporting how much
//! learning an agent has done.

use std::time::Duration;

/// Statistics collected while an agent learns
#[derive(Debug, Clone)]
pub struct LearningStatistics {
    /// Number of finished games the agent learned from
    pub episodes: usize,

    /// Q-value updates driven by real experience
    pub updates: usize,

    /// Q-value updates driven by replayed experience (Dyna-Q planning)
    pub planning_updates: usize,

    /// Number of states in the agent's table(s)
    pub known_states: usize,

    /// Total time spent inside learning hooks
    pub total_time: Duration,
}

impl LearningStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        LearningStatistics {
            episodes: 0,
            updates: 0,
            planning_updates: 0,
            known_states: 0,
            total_time: Duration::from_secs(0),
        }
    }

    /// Returns the total number of Q-value updates
    pub fn total_updates(&self) -> usize {
        self.updates + self.planning_updates
    }

    /// Returns the average learning time per episode in microseconds
    pub fn avg_time_per_episode_us(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.episodes as f64
    }

    /// Returns the number of updates per second
    pub fn updates_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.total_updates() as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "Learning Statistics:\n\
             - Episodes: {}\n\
             - Updates: {}\n\
             - Planning updates: {}\n\
             - Known states: {}\n\
             - Total time: {:.3} seconds\n\
             - Avg time per episode: {:.3} µs\n\
             - Updates per second: {:.1}",
            self.episodes,
            self.updates,
            self.planning_updates,
            self.known_states,
            self.total_time.as_secs_f64(),
            self.avg_time_per_episode_us(),
            self.updates_per_second()
        )
    }
}

impl Default for LearningStatistics {
    fn default() -> Self {
        Self::new()
    }
}
