//! Bit-packed state for boards with at most 64 cells.
//!
//! Each side owns one `u64` with bit `row * columns + column` set where it has
//! a stone. Column heights are packed as 7-bit fields into a third `u64`, the
//! first column in the most significant field. Seven bits per column only fit
//! nine columns into one word, so wider boards derive heights from the
//! occupancy bitboard instead.
//!
//! Win detection shifts a side's bitboard to every candidate anchor cell and
//! compares it against a precomputed mask for the board width and the run
//! length.

use std::fmt;
use std::sync::OnceLock;

use crate::{
    action::{GameAction, GameSide},
    state::{check_action, check_cells, check_dimensions, render, BoardState, MAX_PACKED_CELLS},
    NWinsError, Result,
};

const BITS_PER_COLUMN_SUM: usize = 7;
const COLUMN_SUM_MASK: u64 = 0x7F;
const MAX_PACKED_SUM_COLUMNS: usize = 64 / BITS_PER_COLUMN_SUM;

/// Connection masks for every `(columns, n)` pair a 64-cell board allows
///
/// Entry `(columns - 1) * 64 + (n - 1)` holds the mask of `n` connected cells
/// anchored at bit 0 on a board `columns` wide. Combinations that cannot occur
/// stay zero.
struct MaskTable {
    rows: Vec<u64>,
    columns: Vec<u64>,
    diagonals: Vec<u64>,
    reverse_diagonals: Vec<u64>,
}

impl MaskTable {
    fn build() -> Self {
        let size = MAX_PACKED_CELLS * MAX_PACKED_CELLS;
        let mut table = MaskTable {
            rows: vec![0; size],
            columns: vec![0; size],
            diagonals: vec![0; size],
            reverse_diagonals: vec![0; size],
        };

        for cols in 1..=MAX_PACKED_CELLS {
            let max_rows = MAX_PACKED_CELLS / cols;

            let mut mask = 0u64;
            for n in 1..=cols {
                mask |= 1 << (n - 1);
                table.rows[Self::index(cols, n)] = mask;
            }

            let mut mask = 0u64;
            for n in 1..=max_rows {
                mask |= 1 << ((n - 1) * cols);
                table.columns[Self::index(cols, n)] = mask;
            }

            let mut mask = 0u64;
            for n in 1..=max_rows.min(cols) {
                mask |= 1 << ((n - 1) * cols + (n - 1));
                table.diagonals[Self::index(cols, n)] = mask;

                // bottom-right to top-left
                let reverse = (0..n).fold(0u64, |acc, i| acc | 1 << (i * cols + (n - 1 - i)));
                table.reverse_diagonals[Self::index(cols, n)] = reverse;
            }
        }

        table
    }

    fn index(cols: usize, n: usize) -> usize {
        (cols - 1) * MAX_PACKED_CELLS + (n - 1)
    }
}

fn masks() -> &'static MaskTable {
    static MASKS: OnceLock<MaskTable> = OnceLock::new();
    MASKS.get_or_init(MaskTable::build)
}

/// Bit-packed board state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedState {
    rows: u8,
    columns: u8,
    side_a: u64,
    side_b: u64,
    column_sums: u64,
}

impl PackedState {
    /// Creates an empty board
    ///
    /// Fails with [`NWinsError::InvalidArgument`] on zero dimensions or more
    /// than 64 cells.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        if check_dimensions(rows, columns)? > MAX_PACKED_CELLS {
            return Err(NWinsError::InvalidArgument(format!(
                "a {}x{} board has more than {} cells and cannot be packed",
                rows, columns, MAX_PACKED_CELLS
            )));
        }
        Ok(PackedState {
            rows: rows as u8,
            columns: columns as u8,
            side_a: 0,
            side_b: 0,
            column_sums: 0,
        })
    }

    /// Creates a state from raw cells (row-major, bottom row first)
    pub fn from_cells(rows: usize, columns: usize, cells: &[GameSide]) -> Result<Self> {
        let mut state = Self::new(rows, columns)?;
        let heights = check_cells(rows, columns, cells)?;

        for (index, side) in cells.iter().enumerate() {
            match side {
                GameSide::SideA => state.side_a |= 1 << index,
                GameSide::SideB => state.side_b |= 1 << index,
                GameSide::None => {}
            }
        }
        if columns <= MAX_PACKED_SUM_COLUMNS {
            for (column, height) in heights.into_iter().enumerate() {
                state.column_sums = state.with_column_sum(column, height);
            }
        }

        Ok(state)
    }

    /// Bitboard of side A's stones
    pub fn side_a(&self) -> u64 {
        self.side_a
    }

    /// Bitboard of side B's stones
    pub fn side_b(&self) -> u64 {
        self.side_b
    }

    fn sum_shift(&self, column: usize) -> usize {
        (self.columns as usize - column - 1) * BITS_PER_COLUMN_SUM
    }

    fn with_column_sum(&self, column: usize, sum: usize) -> u64 {
        let shift = self.sum_shift(column);
        (self.column_sums & !(COLUMN_SUM_MASK << shift)) | ((sum as u64) << shift)
    }

    fn has_connection(&self, n: usize, board: u64) -> bool {
        // a side with fewer than n stones cannot have n in a row
        if (board.count_ones() as usize) < n {
            return false;
        }
        self.has_row_connection(n, board)
            || self.has_column_connection(n, board)
            || self.has_diagonal_connection(n, board)
    }

    fn has_row_connection(&self, n: usize, board: u64) -> bool {
        let (rows, cols) = (self.rows as usize, self.columns as usize);
        if n > cols {
            return false;
        }
        let mask = masks().rows[MaskTable::index(cols, n)];
        for row in 0..rows {
            for col in 0..=cols - n {
                if (board >> (row * cols + col)) & mask == mask {
                    return true;
                }
            }
        }
        false
    }

    fn has_column_connection(&self, n: usize, board: u64) -> bool {
        let (rows, cols) = (self.rows as usize, self.columns as usize);
        if n > rows {
            return false;
        }
        let mask = masks().columns[MaskTable::index(cols, n)];
        for col in 0..cols {
            for row in 0..=rows - n {
                if (board >> (row * cols + col)) & mask == mask {
                    return true;
                }
            }
        }
        false
    }

    fn has_diagonal_connection(&self, n: usize, board: u64) -> bool {
        let (rows, cols) = (self.rows as usize, self.columns as usize);
        if n > rows.min(cols) {
            return false;
        }
        let table = masks();
        let diagonal = table.diagonals[MaskTable::index(cols, n)];
        let reverse = table.reverse_diagonals[MaskTable::index(cols, n)];
        for row in 0..=rows - n {
            for col in 0..=cols - n {
                let shifted = board >> (row * cols + col);
                if shifted & diagonal == diagonal || shifted & reverse == reverse {
                    return true;
                }
            }
        }
        false
    }
}

impl BoardState for PackedState {
    fn rows(&self) -> usize {
        self.rows as usize
    }

    fn columns(&self) -> usize {
        self.columns as usize
    }

    fn cell(&self, row: usize, column: usize) -> GameSide {
        let bit = 1u64 << (row * self.columns as usize + column);
        if self.side_a & bit != 0 {
            GameSide::SideA
        } else if self.side_b & bit != 0 {
            GameSide::SideB
        } else {
            GameSide::None
        }
    }

    fn column_height(&self, column: usize) -> usize {
        let (rows, cols) = (self.rows as usize, self.columns as usize);
        if cols <= MAX_PACKED_SUM_COLUMNS {
            ((self.column_sums >> self.sum_shift(column)) & COLUMN_SUM_MASK) as usize
        } else {
            let column_mask = masks().columns[MaskTable::index(cols, rows)] << column;
            ((self.side_a | self.side_b) & column_mask).count_ones() as usize
        }
    }

    fn stone_count(&self) -> usize {
        (self.side_a.count_ones() + self.side_b.count_ones()) as usize
    }

    fn acting_side(&self) -> GameSide {
        if self.side_a.count_ones() == self.side_b.count_ones() {
            GameSide::SideA
        } else {
            GameSide::SideB
        }
    }

    fn apply_action(&self, action: &GameAction) -> Result<Self> {
        check_action(self, action)?;

        let height = self.column_height(action.column);
        let bit = 1u64 << (height * self.columns as usize + action.column);
        let mut next = *self;
        match action.side {
            GameSide::SideA => next.side_a |= bit,
            _ => next.side_b |= bit,
        }
        if (self.columns as usize) <= MAX_PACKED_SUM_COLUMNS {
            next.column_sums = self.with_column_sum(action.column, height + 1);
        }
        Ok(next)
    }

    fn is_connect_n(&self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.has_connection(n, self.side_a) || self.has_connection(n, self.side_b)
    }
}

impl fmt::Display for PackedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f)
    }
}
