//! Configuration for games and agents
//!
//! [`GameSettings`] describes the board. [`AgentParams`] is the loosely typed
//! hyper-parameter map agents and exploration strategies are built from; each
//! consumer pulls the keys it needs and reports missing ones.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{NWinsError, Result};

/// Names of the hyper-parameters understood by agents and strategies
pub mod keys {
    /// Learning rate α
    pub const ALPHA: &str = "alpha";
    /// Discount factor γ
    pub const GAMMA: &str = "gamma";
    /// Trace decay λ for SARSA(λ)
    pub const LAMBDA: &str = "lambda";
    /// How double Q-learning merges its tables: `sum` or `avg`
    pub const COMBINE_QTABLES: &str = "combine_qtables";
    /// Planning updates per episode for Dyna-Q
    pub const DYNAQ_STEPS: &str = "dynaq_steps";
    /// Replay buffer capacity for Dyna-Q
    pub const DYNAQ_MEMORY_SIZE: &str = "dynaq_memory_size";
    /// Replay buffer fill level before Dyna-Q starts planning
    pub const DYNAQ_MIN_MEMORY: &str = "dynaq_min_memory";
    /// Name of the training exploration strategy
    pub const EXP_STRATEGY: &str = "exp_strategy";
    /// Initial epsilon of the linear decay
    pub const START_EPSILON: &str = "start_epsilon";
    /// Final epsilon of the linear decay
    pub const MIN_EPSILON: &str = "min_epsilon";
    /// Episodes until the linear decay reaches its final epsilon
    pub const DECAY_EPISODES: &str = "decay_episodes";
    /// Runner-up probability of the semi-greedy strategy
    pub const SEMI_GREEDY_EPSILON: &str = "semi_greedy_epsilon";
    /// Seed for the agent's random number generator
    pub const SEED: &str = "seed";
}

/// Largest board dimension a state blob can describe
pub const MAX_DIMENSION: usize = u8::MAX as usize;

/// Board geometry and win condition
///
/// # Example
///
/// ```
/// use nwins::GameSettings;
///
/// let settings = GameSettings::default()
///     .with_rows(6)
///     .with_columns(7)
///     .with_stones_to_connect(4);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// Number of rows on the board
    pub rows: usize,

    /// Number of columns on the board
    pub columns: usize,

    /// Stones a side has to connect to win
    pub stones_to_connect: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            rows: 4,
            columns: 5,
            stones_to_connect: 4,
        }
    }
}

impl GameSettings {
    /// Sets the number of rows
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the number of columns
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the number of stones to connect
    pub fn with_stones_to_connect(mut self, stones: usize) -> Self {
        self.stones_to_connect = stones;
        self
    }

    /// Returns the number of cells on the board
    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }

    /// Checks that a game can be played with these settings
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(NWinsError::InvalidArgument(format!(
                "board dimensions must be positive, got {}x{}",
                self.rows, self.columns
            )));
        }
        if self.rows > MAX_DIMENSION || self.columns > MAX_DIMENSION {
            return Err(NWinsError::InvalidArgument(format!(
                "board dimensions must not exceed {}, got {}x{}",
                MAX_DIMENSION, self.rows, self.columns
            )));
        }
        if self.stones_to_connect == 0 {
            return Err(NWinsError::InvalidArgument(
                "stones to connect must be positive".to_string(),
            ));
        }
        if self.stones_to_connect > self.rows.max(self.columns) {
            return Err(NWinsError::InvalidArgument(format!(
                "{} connected stones do not fit on a {}x{} board",
                self.stones_to_connect, self.rows, self.columns
            )));
        }
        Ok(())
    }
}

/// A single hyper-parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A numeric value (integers are stored as whole numbers)
    Number(f64),
    /// A textual value such as a strategy name
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// String-keyed hyper-parameters for agents and exploration strategies
///
/// # Example
///
/// ```
/// use nwins::config::{keys, AgentParams};
///
/// let params = AgentParams::new()
///     .with_number(keys::ALPHA, 0.1)
///     .with_text(keys::EXP_STRATEGY, "greedy_inference");
/// assert_eq!(params.number(keys::ALPHA).unwrap(), 0.1);
/// assert!(params.number(keys::GAMMA).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentParams {
    values: HashMap<String, ParamValue>,
    play_only: bool,
}

impl AgentParams {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a numeric parameter
    pub fn with_number(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), ParamValue::Number(value));
        self
    }

    /// Adds a textual parameter
    pub fn with_text(mut self, key: &str, value: &str) -> Self {
        self.values
            .insert(key.to_string(), ParamValue::Text(value.to_string()));
        self
    }

    /// Marks agents built from these parameters as trainable or play-only
    ///
    /// Play-only agents start in [`AgentMode::Inference`](crate::AgentMode),
    /// never learn, and do not need the learning hyper-parameters or a
    /// training strategy. Parameters are trainable by default.
    pub fn with_trainable(mut self, trainable: bool) -> Self {
        self.play_only = !trainable;
        self
    }

    /// Returns false for play-only parameters
    pub fn is_trainable(&self) -> bool {
        !self.play_only
    }

    /// Inserts or replaces a parameter
    pub fn set(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Returns the raw value of a parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Returns true if the parameter is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns a numeric parameter
    pub fn number(&self, key: &str) -> Result<f64> {
        match self.values.get(key) {
            Some(ParamValue::Number(n)) => Ok(*n),
            Some(ParamValue::Text(t)) => t.trim().parse::<f64>().map_err(|_| {
                NWinsError::InvalidArgument(format!("parameter '{}' is not a number: {}", key, t))
            }),
            None => Err(NWinsError::MissingParameter(key.to_string())),
        }
    }

    /// Returns a numeric parameter, or `default` when it is absent
    pub fn number_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.contains(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    /// Returns a non-negative whole-number parameter
    pub fn count(&self, key: &str) -> Result<usize> {
        let value = self.number(key)?;
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(NWinsError::InvalidArgument(format!(
                "parameter '{}' must be a non-negative whole number, got {}",
                key, value
            )));
        }
        Ok(value as usize)
    }

    /// Returns a whole-number parameter that may be negative
    pub fn integer(&self, key: &str) -> Result<i64> {
        let value = self.number(key)?;
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(NWinsError::InvalidArgument(format!(
                "parameter '{}' must be a whole number, got {}",
                key, value
            )));
        }
        Ok(value as i64)
    }

    /// Returns a textual parameter
    pub fn text(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(ParamValue::Text(t)) => Ok(t.as_str()),
            Some(ParamValue::Number(n)) => Err(NWinsError::InvalidArgument(format!(
                "parameter '{}' must be text, got {}",
                key, n
            ))),
            None => Err(NWinsError::MissingParameter(key.to_string())),
        }
    }

    /// Returns the seed parameter, if any
    pub fn seed(&self) -> Result<Option<u64>> {
        if !self.contains(keys::SEED) {
            return Ok(None);
        }
        Ok(Some(self.count(keys::SEED)? as u64))
    }
}

/// How double Q-learning merges its two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Add the values of matching actions
    #[default]
    Sum,
    /// Average the values of matching actions
    Average,
}

impl FromStr for CombineMode {
    type Err = NWinsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "sum" => Ok(CombineMode::Sum),
            "avg" => Ok(CombineMode::Average),
            other => Err(NWinsError::InvalidArgument(format!(
                "unknown table combine mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineMode::Sum => write!(f, "sum"),
            CombineMode::Average => write!(f, "avg"),
        }
    }
}

/// The learning algorithm behind an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Uniformly random moves, no learning
    Random,
    /// Naive Q-learning
    SimpleQL,
    /// Double Q-learning
    DoubleQL,
    /// Dyna-Q with experience replay
    DynaQL,
    /// SARSA(λ) with eligibility traces
    SarsaLambda,
}

impl FromStr for AgentKind {
    type Err = NWinsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "random" => Ok(AgentKind::Random),
            "simple_ql" => Ok(AgentKind::SimpleQL),
            "double_ql" => Ok(AgentKind::DoubleQL),
            "dyna_ql" => Ok(AgentKind::DynaQL),
            "sarsa_lambda" => Ok(AgentKind::SarsaLambda),
            other => Err(NWinsError::InvalidArgument(format!(
                "unknown agent type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentKind::Random => "random",
            AgentKind::SimpleQL => "simple_ql",
            AgentKind::DoubleQL => "double_ql",
            AgentKind::DynaQL => "dyna_ql",
            AgentKind::SarsaLambda => "sarsa_lambda",
        };
        write!(f, "{}", name)
    }
}
