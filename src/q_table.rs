//! Tabular action-value storage.
//!
//! A [`QTable`] maps a [`GameState`] to the [`ActionValues`] of its legal
//! actions. States enter the table only through
//! [`QTable::ensure_initialized`], which seeds one random value per legal
//! action; lookups never insert anything.

use std::collections::{hash_map, BTreeMap, HashMap};

use rand::Rng;

use crate::{
    action::GameAction,
    config::CombineMode,
    state::{BoardState, GameState},
};

/// Values of the actions available in one state, in ascending column order
pub type ActionValues = BTreeMap<GameAction, f64>;

/// Two-level mapping from state to action to estimated return
#[derive(Debug, Clone, Default)]
pub struct QTable {
    entries: HashMap<GameState, ActionValues>,
}

impl QTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `state` with one uniformly drawn value in `[0, 1)` per legal action
    ///
    /// Returns true if the state was new. Known states are left untouched.
    pub fn ensure_initialized<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> bool {
        if self.entries.contains_key(state) {
            return false;
        }
        let values = state
            .possible_actions()
            .into_iter()
            .map(|action| (action, rng.gen::<f64>()))
            .collect();
        self.entries.insert(state.clone(), values);
        true
    }

    /// Adds `state` with a value of zero per legal action
    ///
    /// Returns true if the state was new.
    pub fn ensure_zeroed(&mut self, state: &GameState) -> bool {
        if self.entries.contains_key(state) {
            return false;
        }
        let values = state
            .possible_actions()
            .into_iter()
            .map(|action| (action, 0.0))
            .collect();
        self.entries.insert(state.clone(), values);
        true
    }

    /// Returns true if the state is in the table
    pub fn contains(&self, state: &GameState) -> bool {
        self.entries.contains_key(state)
    }

    /// Returns the action values of a state
    pub fn get(&self, state: &GameState) -> Option<&ActionValues> {
        self.entries.get(state)
    }

    /// Returns the action values of a state for modification
    pub fn get_mut(&mut self, state: &GameState) -> Option<&mut ActionValues> {
        self.entries.get_mut(state)
    }

    /// Returns the value of one action
    pub fn value(&self, state: &GameState, action: &GameAction) -> Option<f64> {
        self.entries.get(state)?.get(action).copied()
    }

    /// Sets the value of one action, adding the state if needed
    pub fn set_value(&mut self, state: &GameState, action: GameAction, value: f64) {
        match self.entries.get_mut(state) {
            Some(values) => {
                values.insert(action, value);
            }
            None => {
                let mut values = ActionValues::new();
                values.insert(action, value);
                self.entries.insert(state.clone(), values);
            }
        }
    }

    /// Replaces all action values of a state
    pub fn insert(&mut self, state: GameState, values: ActionValues) -> Option<ActionValues> {
        self.entries.insert(state, values)
    }

    /// Returns the number of states
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no state
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of (state, action) pairs
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(|values| values.len()).sum()
    }

    /// Iterates over all states and their action values
    pub fn iter(&self) -> hash_map::Iter<'_, GameState, ActionValues> {
        self.entries.iter()
    }

    /// Iterates mutably over all states and their action values
    pub fn iter_mut(&mut self) -> hash_map::IterMut<'_, GameState, ActionValues> {
        self.entries.iter_mut()
    }

    /// Merges the action values of `state` from two tables
    ///
    /// Actions present in only one table keep that table's value.
    pub fn combine_state(
        first: &QTable,
        second: &QTable,
        state: &GameState,
        mode: CombineMode,
    ) -> ActionValues {
        let mut grouped: BTreeMap<GameAction, Vec<f64>> = BTreeMap::new();
        for values in [first.get(state), second.get(state)].into_iter().flatten() {
            for (&action, &value) in values {
                grouped.entry(action).or_default().push(value);
            }
        }
        grouped
            .into_iter()
            .map(|(action, values)| {
                let sum: f64 = values.iter().sum();
                let combined = match mode {
                    CombineMode::Sum => sum,
                    CombineMode::Average => sum / values.len() as f64,
                };
                (action, combined)
            })
            .collect()
    }

    /// Merges two tables over the states of `first`
    pub fn combine(first: &QTable, second: &QTable, mode: CombineMode) -> QTable {
        let entries = first
            .entries
            .keys()
            .map(|state| (state.clone(), Self::combine_state(first, second, state, mode)))
            .collect();
        QTable { entries }
    }
}

impl<'a> IntoIterator for &'a QTable {
    type Item = (&'a GameState, &'a ActionValues);
    type IntoIter = hash_map::Iter<'a, GameState, ActionValues>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
