//! Utility functions shared by the learning agents
//!
//! This module contains the temporal-difference formula and helpers that
//! rank action ratings with a well-defined tie order.

use crate::{action::GameAction, q_table::ActionValues};

/// Calculates the temporal-difference target
///
/// This is the reward plus the discounted bootstrap estimate.
pub fn td_target(reward: f64, gamma: f64, bootstrap: f64) -> f64 {
    reward + gamma * bootstrap
}

/// Calculates the updated value of a Q-learning step
///
/// `Q(s,a) + α · (target − Q(s,a))`
pub fn td_update(current: f64, alpha: f64, target: f64) -> f64 {
    current + alpha * (target - current)
}

/// Returns the action with the highest rating
///
/// Ties go to the first maximum in iteration order, which for
/// [`ActionValues`] is ascending column order.
pub fn argmax(ratings: &ActionValues) -> Option<(GameAction, f64)> {
    ratings.iter().fold(None, |best, (&action, &value)| match best {
        Some((_, best_value)) if best_value >= value => best,
        _ => Some((action, value)),
    })
}

/// Returns the highest rating, or `None` for an empty map
pub fn max_value(ratings: &ActionValues) -> Option<f64> {
    argmax(ratings).map(|(_, value)| value)
}

/// Returns all actions sorted by descending rating
///
/// The sort is stable, so equally rated actions keep ascending column order.
pub fn ranked(ratings: &ActionValues) -> Vec<(GameAction, f64)> {
    let mut ranking: Vec<(GameAction, f64)> = ratings.iter().map(|(&a, &v)| (a, v)).collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking
}
