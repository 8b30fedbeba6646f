//! Board state representations.
//!
//! [`BoardState`] is the interface every representation implements. Two
//! representations exist: [`packed::PackedState`] keeps one 64-bit board per side
//! and only works for boards with at most 64 cells, [`generic::GenericState`]
//! keeps a flat cell array and works for any size. [`GameState`] picks one of
//! them from the board size, and everything outside this module only ever
//! talks to [`GameState`].
//!
//! Cells are indexed row-major starting at the bottom-left corner:
//! `index = row * columns + column` with row 0 at the bottom.

pub mod generic;
pub mod packed;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{
    action::{GameAction, GameSide},
    codec, NWinsError, Result,
};

pub use generic::GenericState;
pub use packed::PackedState;

/// Largest number of cells the packed representation can hold
pub const MAX_PACKED_CELLS: usize = 64;

/// Trait implemented by every board representation
///
/// States are immutable values: [`BoardState::apply_action`] returns a new
/// state and leaves the receiver untouched. The side due to act is never
/// stored; it follows from the parity of the number of stones on the board.
pub trait BoardState: Clone + fmt::Debug + Send + Sync {
    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn columns(&self) -> usize;

    /// Returns the occupant of the cell at `row` (0 = bottom) and `column`
    fn cell(&self, row: usize, column: usize) -> GameSide;

    /// Returns the number of stones in `column`
    fn column_height(&self, column: usize) -> usize;

    /// Returns the total number of stones on the board
    fn stone_count(&self) -> usize;

    /// Drops a stone for `action.side` into `action.column`
    ///
    /// Fails with [`NWinsError::InvalidAction`] when the side is
    /// [`GameSide::None`], the side is not due to act, the column does not
    /// exist or the column is already full.
    fn apply_action(&self, action: &GameAction) -> Result<Self>;

    /// Returns true if either side has at least `n` stones in a row along a
    /// row, a column or one of the two diagonal directions
    ///
    /// A connection of zero stones is never reported.
    fn is_connect_n(&self, n: usize) -> bool;

    /// Returns all cells, row-major from the bottom row
    fn cells(&self) -> Vec<GameSide> {
        let columns = self.columns();
        (0..self.rows() * columns)
            .map(|index| self.cell(index / columns, index % columns))
            .collect()
    }

    /// Returns the number of stones per column
    fn column_heights(&self) -> Vec<usize> {
        (0..self.columns()).map(|c| self.column_height(c)).collect()
    }

    /// Returns the side due to act
    fn acting_side(&self) -> GameSide {
        if self.stone_count() % 2 == 0 {
            GameSide::SideA
        } else {
            GameSide::SideB
        }
    }

    /// Returns true if no column can take another stone
    fn is_full(&self) -> bool {
        self.stone_count() == self.rows() * self.columns()
    }

    /// Returns one action per column that is not full, in ascending column
    /// order, all tagged with the side due to act
    fn possible_actions(&self) -> Vec<GameAction> {
        let side = self.acting_side();
        let rows = self.rows();
        (0..self.columns())
            .filter(|&column| self.column_height(column) < rows)
            .map(|column| GameAction::new(column, side))
            .collect()
    }
}

/// Checks the legality rules shared by all representations
pub(crate) fn check_action<S: BoardState>(state: &S, action: &GameAction) -> Result<()> {
    if action.side.is_none() {
        return Err(NWinsError::InvalidAction(
            "the acting side must be either SideA or SideB".to_string(),
        ));
    }
    if action.column >= state.columns() {
        return Err(NWinsError::InvalidAction(format!(
            "column {} is out of range for a board with {} columns",
            action.column,
            state.columns()
        )));
    }
    let due = state.acting_side();
    if action.side != due {
        return Err(NWinsError::InvalidAction(format!(
            "{} is not due to act, it is {}'s turn",
            action.side, due
        )));
    }
    if state.column_height(action.column) >= state.rows() {
        return Err(NWinsError::InvalidAction(format!(
            "column {} is already full",
            action.column
        )));
    }
    Ok(())
}

/// Validates raw cells and returns the column heights they imply
///
/// Rejects floating stones and stone counts that no alternating game can reach.
pub(crate) fn check_cells(rows: usize, columns: usize, cells: &[GameSide]) -> Result<Vec<usize>> {
    let cell_count = check_dimensions(rows, columns)?;
    if cells.len() != cell_count {
        return Err(NWinsError::InvalidArgument(format!(
            "expected {} cells for a {}x{} board, got {}",
            cell_count,
            rows,
            columns,
            cells.len()
        )));
    }

    let mut heights = vec![0usize; columns];
    for (column, height) in heights.iter_mut().enumerate() {
        let mut open = false;
        for row in 0..rows {
            let side = cells[row * columns + column];
            if side.is_none() {
                open = true;
            } else if open {
                return Err(NWinsError::InvalidArgument(format!(
                    "stone at row {} of column {} floats above an empty cell",
                    row, column
                )));
            } else {
                *height += 1;
            }
        }
    }

    let stones_a = cells.iter().filter(|&&s| s == GameSide::SideA).count();
    let stones_b = cells.iter().filter(|&&s| s == GameSide::SideB).count();
    if stones_a != stones_b && stones_a != stones_b + 1 {
        return Err(NWinsError::InvalidArgument(format!(
            "{} stones of side A and {} of side B cannot come from alternating moves",
            stones_a, stones_b
        )));
    }

    Ok(heights)
}

/// Rejects empty or overflowing boards and returns the cell count
pub(crate) fn check_dimensions(rows: usize, columns: usize) -> Result<usize> {
    if rows == 0 {
        return Err(NWinsError::InvalidArgument(
            "rows needs to be greater than 0".to_string(),
        ));
    }
    if columns == 0 {
        return Err(NWinsError::InvalidArgument(
            "columns needs to be greater than 0".to_string(),
        ));
    }
    rows.checked_mul(columns).ok_or_else(|| {
        NWinsError::InvalidArgument(format!("a {}x{} board has too many cells", rows, columns))
    })
}

/// Draws the board top row first
pub(crate) fn render<S: BoardState>(state: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let separator = format!("+{}", "---+".repeat(state.columns()));
    writeln!(f, "{}", separator)?;
    for row in (0..state.rows()).rev() {
        for column in 0..state.columns() {
            let mark = match state.cell(row, column) {
                GameSide::SideA => 'A',
                GameSide::SideB => 'B',
                GameSide::None => ' ',
            };
            write!(f, "| {} ", mark)?;
        }
        writeln!(f, "|")?;
        writeln!(f, "{}", separator)?;
    }
    Ok(())
}

/// A board state, stored in whichever representation fits its size
///
/// Two states are equal when they have the same dimensions and the same cell
/// contents, regardless of which representation holds them.
#[derive(Debug, Clone)]
pub enum GameState {
    /// Bit-packed state for boards with at most 64 cells
    Packed(PackedState),
    /// Cell-array state for boards of any size
    Generic(GenericState),
}

impl GameState {
    /// Creates an empty board, packed whenever `rows * columns <= 64`
    pub fn empty(rows: usize, columns: usize) -> Result<Self> {
        if check_dimensions(rows, columns)? <= MAX_PACKED_CELLS {
            Ok(GameState::Packed(PackedState::new(rows, columns)?))
        } else {
            Ok(GameState::Generic(GenericState::new(rows, columns)?))
        }
    }

    /// Creates an empty packed board
    ///
    /// Fails with [`NWinsError::InvalidArgument`] when the board has more than
    /// 64 cells.
    pub fn packed(rows: usize, columns: usize) -> Result<Self> {
        Ok(GameState::Packed(PackedState::new(rows, columns)?))
    }

    /// Creates an empty board in the generic representation, whatever its size
    pub fn generic(rows: usize, columns: usize) -> Result<Self> {
        Ok(GameState::Generic(GenericState::new(rows, columns)?))
    }

    /// Creates a state from raw cells (row-major, bottom row first)
    pub fn from_cells(rows: usize, columns: usize, cells: &[GameSide]) -> Result<Self> {
        if check_dimensions(rows, columns)? <= MAX_PACKED_CELLS {
            Ok(GameState::Packed(PackedState::from_cells(rows, columns, cells)?))
        } else {
            Ok(GameState::Generic(GenericState::from_cells(rows, columns, cells)?))
        }
    }

    /// Returns true when the packed representation is in use
    pub fn is_packed(&self) -> bool {
        matches!(self, GameState::Packed(_))
    }

    /// Returns the Base64 hash string of this state
    pub fn to_hash(&self) -> Result<String> {
        codec::to_hash(self)
    }

    /// Parses a Base64 hash string
    pub fn from_hash(hash: &str) -> Result<Self> {
        codec::from_hash(hash)
    }

    /// Returns true if `hash` decodes to a state equal to this one
    ///
    /// A string that does not decode never matches.
    pub fn matches_hash(&self, hash: &str) -> bool {
        codec::from_hash(hash)
            .map(|other| other == *self)
            .unwrap_or(false)
    }

    /// Returns every state reachable by one legal action, in column order
    pub fn successors(&self) -> Result<Vec<GameState>> {
        self.possible_actions()
            .iter()
            .map(|action| self.apply_action(action))
            .collect()
    }
}

impl BoardState for GameState {
    fn rows(&self) -> usize {
        match self {
            GameState::Packed(state) => state.rows(),
            GameState::Generic(state) => state.rows(),
        }
    }

    fn columns(&self) -> usize {
        match self {
            GameState::Packed(state) => state.columns(),
            GameState::Generic(state) => state.columns(),
        }
    }

    fn cell(&self, row: usize, column: usize) -> GameSide {
        match self {
            GameState::Packed(state) => state.cell(row, column),
            GameState::Generic(state) => state.cell(row, column),
        }
    }

    fn column_height(&self, column: usize) -> usize {
        match self {
            GameState::Packed(state) => state.column_height(column),
            GameState::Generic(state) => state.column_height(column),
        }
    }

    fn stone_count(&self) -> usize {
        match self {
            GameState::Packed(state) => state.stone_count(),
            GameState::Generic(state) => state.stone_count(),
        }
    }

    fn apply_action(&self, action: &GameAction) -> Result<Self> {
        match self {
            GameState::Packed(state) => state.apply_action(action).map(GameState::Packed),
            GameState::Generic(state) => state.apply_action(action).map(GameState::Generic),
        }
    }

    fn is_connect_n(&self, n: usize) -> bool {
        match self {
            GameState::Packed(state) => state.is_connect_n(n),
            GameState::Generic(state) => state.is_connect_n(n),
        }
    }

    fn cells(&self) -> Vec<GameSide> {
        match self {
            GameState::Packed(state) => state.cells(),
            GameState::Generic(state) => state.cells(),
        }
    }

    fn column_heights(&self) -> Vec<usize> {
        match self {
            GameState::Packed(state) => state.column_heights(),
            GameState::Generic(state) => state.column_heights(),
        }
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GameState::Packed(a), GameState::Packed(b)) => a == b,
            (GameState::Generic(a), GameState::Generic(b)) => a == b,
            _ => {
                self.rows() == other.rows()
                    && self.columns() == other.columns()
                    && self.column_heights() == other.column_heights()
                    && self.cells() == other.cells()
            }
        }
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    // Boards up to 64 cells hash their two side bitboards in either representation.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows().hash(state);
        self.columns().hash(state);
        match self {
            GameState::Packed(packed) => {
                packed.side_a().hash(state);
                packed.side_b().hash(state);
            }
            GameState::Generic(generic) => match generic.bitboards() {
                Some((side_a, side_b)) => {
                    side_a.hash(state);
                    side_b.hash(state);
                }
                None => generic.cell_slice().hash(state),
            },
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f)
    }
}

impl From<PackedState> for GameState {
    fn from(state: PackedState) -> Self {
        GameState::Packed(state)
    }
}

impl From<GenericState> for GameState {
    fn from(state: GenericState) -> Self {
        GameState::Generic(state)
    }
}
