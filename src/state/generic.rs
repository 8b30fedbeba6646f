//! Cell-array state for boards of any size.

use std::fmt;

use crate::{
    action::{GameAction, GameSide},
    state::{check_action, check_cells, check_dimensions, render, BoardState, MAX_PACKED_CELLS},
    Result,
};

/// Directions scanned for connections: row, column, diagonal, reverse diagonal
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Board state backed by a flat cell array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericState {
    rows: usize,
    columns: usize,
    cells: Vec<GameSide>,
    column_sums: Vec<usize>,
}

impl GenericState {
    /// Creates an empty board
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        let cell_count = check_dimensions(rows, columns)?;
        Ok(GenericState {
            rows,
            columns,
            cells: vec![GameSide::None; cell_count],
            column_sums: vec![0; columns],
        })
    }

    /// Creates a state from raw cells (row-major, bottom row first)
    pub fn from_cells(rows: usize, columns: usize, cells: &[GameSide]) -> Result<Self> {
        let column_sums = check_cells(rows, columns, cells)?;
        Ok(GenericState {
            rows,
            columns,
            cells: cells.to_vec(),
            column_sums,
        })
    }

    /// Borrows the cells without copying them
    pub fn cell_slice(&self) -> &[GameSide] {
        &self.cells
    }

    /// Returns the per-side bitboards for boards with at most 64 cells
    ///
    /// The layout matches the packed representation bit for bit.
    pub fn bitboards(&self) -> Option<(u64, u64)> {
        if self.cells.len() > MAX_PACKED_CELLS {
            return None;
        }
        let mut side_a = 0u64;
        let mut side_b = 0u64;
        for (index, side) in self.cells.iter().enumerate() {
            match side {
                GameSide::SideA => side_a |= 1 << index,
                GameSide::SideB => side_b |= 1 << index,
                GameSide::None => {}
            }
        }
        Some((side_a, side_b))
    }

    fn is_run(&self, row: usize, column: usize, (dr, dc): (isize, isize), n: usize) -> bool {
        let side = self.cells[row * self.columns + column];
        if side.is_none() {
            return false;
        }
        let last_row = row as isize + dr * (n as isize - 1);
        let last_column = column as isize + dc * (n as isize - 1);
        if last_row < 0
            || last_row >= self.rows as isize
            || last_column < 0
            || last_column >= self.columns as isize
        {
            return false;
        }
        (1..n as isize).all(|i| {
            let r = (row as isize + dr * i) as usize;
            let c = (column as isize + dc * i) as usize;
            self.cells[r * self.columns + c] == side
        })
    }
}

impl BoardState for GenericState {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn cell(&self, row: usize, column: usize) -> GameSide {
        self.cells[row * self.columns + column]
    }

    fn column_height(&self, column: usize) -> usize {
        self.column_sums[column]
    }

    fn stone_count(&self) -> usize {
        self.column_sums.iter().sum()
    }

    fn apply_action(&self, action: &GameAction) -> Result<Self> {
        check_action(self, action)?;

        let mut next = self.clone();
        let row = self.column_sums[action.column];
        next.cells[row * self.columns + action.column] = action.side;
        next.column_sums[action.column] = row + 1;
        Ok(next)
    }

    fn is_connect_n(&self, n: usize) -> bool {
        if n == 0 || self.stone_count() < n {
            return false;
        }
        for row in 0..self.rows {
            for column in 0..self.columns {
                if DIRECTIONS
                    .iter()
                    .any(|&direction| self.is_run(row, column, direction, n))
                {
                    return true;
                }
            }
        }
        false
    }

    fn cells(&self) -> Vec<GameSide> {
        self.cells.clone()
    }

    fn column_heights(&self) -> Vec<usize> {
        self.column_sums.clone()
    }
}

impl fmt::Display for GenericState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f)
    }
}
