//! Value types describing who plays and what is played.

use std::fmt;

use crate::{NWinsError, Result};

/// The occupant of a board cell, or the side performing an action
///
/// The numeric values are part of the persistence formats and the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum GameSide {
    /// An empty cell; never a legal acting side
    #[default]
    None = 0,
    /// The side that always moves first
    SideA = 1,
    /// The side that moves second
    SideB = 2,
}

impl GameSide {
    /// Returns the opposing side
    ///
    /// Fails with [`NWinsError::InvalidArgument`] for [`GameSide::None`].
    pub fn opponent(self) -> Result<GameSide> {
        match self {
            GameSide::SideA => Ok(GameSide::SideB),
            GameSide::SideB => Ok(GameSide::SideA),
            GameSide::None => Err(NWinsError::InvalidArgument(
                "an empty cell has no opponent".to_string(),
            )),
        }
    }

    /// Returns the integer used for this side in files and blobs
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for an empty cell
    pub fn is_none(self) -> bool {
        self == GameSide::None
    }
}

impl TryFrom<u8> for GameSide {
    type Error = NWinsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(GameSide::None),
            1 => Ok(GameSide::SideA),
            2 => Ok(GameSide::SideB),
            other => Err(NWinsError::InvalidArgument(format!(
                "{} is not a valid side",
                other
            ))),
        }
    }
}

impl fmt::Display for GameSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSide::None => write!(f, "None"),
            GameSide::SideA => write!(f, "SideA"),
            GameSide::SideB => write!(f, "SideB"),
        }
    }
}

/// Dropping a stone of `side` into `column`
///
/// Actions order by column first, so every collection of actions that share a
/// side iterates in ascending column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameAction {
    /// Zero-based column index
    pub column: usize,
    /// The side putting the stone
    pub side: GameSide,
}

impl GameAction {
    /// Creates a new action
    pub fn new(column: usize, side: GameSide) -> Self {
        GameAction { column, side }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} put a stone at {}", self.side, self.column)
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// Side A connected N stones
    WinSideA,
    /// The board filled up without a connection
    Tie,
    /// Side B connected N stones
    WinSideB,
}

impl GameResult {
    /// Returns the winning side, or `None` for a tie
    pub fn winner(self) -> Option<GameSide> {
        match self {
            GameResult::WinSideA => Some(GameSide::SideA),
            GameResult::WinSideB => Some(GameSide::SideB),
            GameResult::Tie => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WinSideA => write!(f, "player A wins"),
            GameResult::WinSideB => write!(f, "player B wins"),
            GameResult::Tie => write!(f, "tie"),
        }
    }
}
