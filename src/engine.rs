//! The game state machine
//!
//! [`GameEngine`] owns the history of one game. Every applied action is
//! recorded as an [`ActionLog`] together with its reward:
//!
//! - 1.0 for the action completing a connection of N stones
//! - 0.5 for the last action of each side when the board fills up without a
//!   connection
//! - 0.0 for everything else
//!
//! The second-to-last action of a tied game already earns its 0.5, so the
//! engine looks one ply ahead when only two cells are left.

use std::fmt;

use log::trace;

use crate::{
    action::{GameAction, GameResult, GameSide},
    config::GameSettings,
    state::{BoardState, GameState},
    NWinsError, Result,
};

/// Reward for the action completing a connection
pub const WIN_REWARD: f64 = 1.0;
/// Reward for the final action of each side in a tied game
pub const TIE_REWARD: f64 = 0.5;
/// Reward for every other action
pub const NEUTRAL_REWARD: f64 = 0.0;

/// Everything known about one applied action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLog {
    /// State before the action
    pub old_state: GameState,
    /// State after the action
    pub new_state: GameState,
    /// The action that was applied
    pub action: GameAction,
    /// Reward earned by the action
    pub reward: f64,
    /// Whether the action ended the game
    pub is_terminal: bool,
}

impl ActionLog {
    /// Creates a new log entry
    pub fn new(
        old_state: GameState,
        new_state: GameState,
        action: GameAction,
        reward: f64,
        is_terminal: bool,
    ) -> Self {
        ActionLog {
            old_state,
            new_state,
            action,
            reward,
            is_terminal,
        }
    }
}

impl fmt::Display for ActionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action: {}, reward: {}, is terminal: {}",
            self.action, self.reward, self.is_terminal
        )
    }
}

/// Read access to a played game, handed to agents when it is over
pub trait GameSummary {
    /// All logs in the order the actions were applied
    fn all_actions(&self) -> Vec<ActionLog>;

    /// The outcome, or `None` while the game is still running
    fn result(&self) -> Option<GameResult>;

    /// The logs of one side in the order the actions were applied
    fn actions_of(&self, side: GameSide) -> Vec<ActionLog> {
        self.all_actions()
            .into_iter()
            .filter(|log| log.action.side == side)
            .collect()
    }
}

/// A single game of connect-N
///
/// # Example
///
/// ```
/// use nwins::{GameAction, GameEngine, GameResult, GameSettings, GameSide, GameSummary};
///
/// let mut engine = GameEngine::new(GameSettings::default()).unwrap();
/// for _ in 0..3 {
///     engine.apply_action(GameAction::new(0, GameSide::SideA)).unwrap();
///     engine.apply_action(GameAction::new(1, GameSide::SideB)).unwrap();
/// }
/// let log = engine.apply_action(GameAction::new(0, GameSide::SideA)).unwrap();
/// assert_eq!(log.reward, 1.0);
/// assert_eq!(engine.result(), Some(GameResult::WinSideA));
/// ```
#[derive(Debug, Clone)]
pub struct GameEngine {
    settings: GameSettings,
    initial_state: GameState,
    history: Vec<ActionLog>,
}

impl GameEngine {
    /// Creates an engine with an empty board
    pub fn new(settings: GameSettings) -> Result<Self> {
        settings.validate()?;
        let initial_state = GameState::empty(settings.rows, settings.columns)?;
        Ok(GameEngine {
            settings,
            initial_state,
            history: Vec::new(),
        })
    }

    /// Returns the settings of this game
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Returns the applied actions, oldest first
    pub fn history(&self) -> &[ActionLog] {
        &self.history
    }

    /// Returns the most recent log entry
    pub fn last_log(&self) -> Option<&ActionLog> {
        self.history.last()
    }

    /// Returns the most recently applied action
    pub fn last_action(&self) -> Option<GameAction> {
        self.history.last().map(|log| log.action)
    }

    /// Returns the current board
    pub fn current_state(&self) -> &GameState {
        self.history
            .last()
            .map_or(&self.initial_state, |log| &log.new_state)
    }

    /// Returns the side due to act
    pub fn acting_side(&self) -> GameSide {
        match self.last_action() {
            Some(action) => action.side.opponent().unwrap_or(GameSide::SideA),
            None => GameSide::SideA,
        }
    }

    /// Returns the legal actions in the current state
    pub fn possible_actions(&self) -> Vec<GameAction> {
        self.current_state().possible_actions()
    }

    /// Returns true once the game is won or the board is full
    pub fn is_terminal(&self) -> bool {
        self.history.last().map_or(false, |log| log.is_terminal)
    }

    /// Applies an action and records its outcome
    ///
    /// Fails with [`NWinsError::InvalidAction`] when the action is illegal in
    /// the current state or the game is already over.
    pub fn apply_action(&mut self, action: GameAction) -> Result<&ActionLog> {
        if self.is_terminal() {
            return Err(NWinsError::InvalidAction(format!(
                "the game is already over, cannot apply '{}'",
                action
            )));
        }

        let n = self.settings.stones_to_connect;
        let cells = self.settings.cells();
        let old_state = self.current_state().clone();
        let new_state = old_state.apply_action(&action)?;

        let is_win = new_state.is_connect_n(n);
        let mut is_tie = !is_win && self.history.len() + 1 == cells;

        // with two cells left, the final move decides whether this one ties
        if !is_win && self.history.len() + 2 == cells {
            if let Some(final_action) = new_state.possible_actions().first() {
                let final_state = new_state.apply_action(final_action)?;
                is_tie = !final_state.is_connect_n(n);
            }
        }

        let reward = if is_win {
            WIN_REWARD
        } else if is_tie {
            TIE_REWARD
        } else {
            NEUTRAL_REWARD
        };
        let is_terminal = is_win || new_state.is_full();

        let log = ActionLog::new(old_state, new_state, action, reward, is_terminal);
        trace!("{}", log);
        self.history.push(log);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Clears the history so the engine can host the next game
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl GameSummary for GameEngine {
    fn all_actions(&self) -> Vec<ActionLog> {
        self.history.clone()
    }

    fn result(&self) -> Option<GameResult> {
        let last = self.history.last()?;
        if last.new_state.is_connect_n(self.settings.stones_to_connect) {
            return match last.action.side {
                GameSide::SideA => Some(GameResult::WinSideA),
                _ => Some(GameResult::WinSideB),
            };
        }
        if last.is_terminal {
            Some(GameResult::Tie)
        } else {
            None
        }
    }

    fn actions_of(&self, side: GameSide) -> Vec<ActionLog> {
        self.history
            .iter()
            .filter(|log| log.action.side == side)
            .cloned()
            .collect()
    }
}
