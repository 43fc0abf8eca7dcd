//! Column-drop board geometry
//!
//! Cells are addressed as `(column, row)`. Column 0 is the left edge and row 0
//! is the bottom row, so a dropped token settles on the lowest empty row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of a rendered cell in `Display` output
const CELL_WIDTH: usize = 4;

/// Direction vectors (dc, dr) scanned for runs: right, up, up-right, down-right
pub const RUN_DIRECTIONS: [(i64, i64); 4] = [
    (1, 0),  // horizontal
    (0, 1),  // vertical
    (1, 1),  // diagonal /
    (1, -1), // diagonal \
];

/// A single board cell
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Owned(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Name of the owning player, if any
    pub fn owner(&self) -> Option<&str> {
        match self {
            Cell::Empty => None,
            Cell::Owned(name) => Some(name),
        }
    }
}

/// Columns x rows grid with gravity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    columns: usize,
    rows: usize,
    /// Column-major storage: index = column * rows + row
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the cell at (column, row), `None` when off the board
    pub fn get(&self, column: usize, row: usize) -> Option<&Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(column * self.rows + row)
    }

    /// Owner of (column, row), `None` for empty or off-board cells
    pub fn owner_at(&self, column: usize, row: usize) -> Option<&str> {
        self.get(column, row).and_then(Cell::owner)
    }

    /// Cells of one column, bottom first
    pub fn column(&self, column: usize) -> Option<&[Cell]> {
        if column >= self.columns {
            return None;
        }
        let start = column * self.rows;
        Some(&self.cells[start..start + self.rows])
    }

    /// Lowest empty row of a column, `None` if full or off the board
    pub fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        self.column(column)?.iter().position(Cell::is_empty)
    }

    /// Check if a column is full (off-board columns count as full)
    pub fn is_column_full(&self, column: usize) -> bool {
        self.lowest_empty_row(column).is_none()
    }

    /// Check if every cell is occupied
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Columns that can still take a token
    pub fn open_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&col| !self.is_column_full(col))
            .collect()
    }

    /// Number of occupied cells
    pub fn token_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Drop a token for `owner` into `column`, returning the row it landed on.
    ///
    /// Returns `None` (and leaves the board untouched) if the column is full
    /// or off the board.
    pub fn drop_token(&mut self, column: usize, owner: &str) -> Option<usize> {
        let row = self.lowest_empty_row(column)?;
        self.cells[column * self.rows + row] = Cell::Owned(owner.to_string());
        Some(row)
    }

    /// Find an owner with `win_length` consecutive cells.
    ///
    /// Every occupied cell is tried as the start of a run in each of the four
    /// directions; runs that would leave the board are rejected.
    pub fn find_run(&self, win_length: usize) -> Option<&str> {
        let win_length = win_length.max(1);
        if !self.fits_run(win_length) {
            return None;
        }
        for column in 0..self.columns {
            for row in 0..self.rows {
                let Some(owner) = self.owner_at(column, row) else {
                    continue;
                };
                for &(dc, dr) in RUN_DIRECTIONS.iter() {
                    if self.run_from(column, row, dc, dr, owner, win_length) {
                        return Some(owner);
                    }
                }
            }
        }
        None
    }

    /// Check if `owner` has a run anywhere on the board
    pub fn has_run_for(&self, owner: &str, win_length: usize) -> bool {
        let win_length = win_length.max(1);
        if !self.fits_run(win_length) {
            return false;
        }
        (0..self.columns).any(|column| {
            (0..self.rows).any(|row| {
                self.owner_at(column, row) == Some(owner)
                    && RUN_DIRECTIONS
                        .iter()
                        .any(|&(dc, dr)| self.run_from(column, row, dc, dr, owner, win_length))
            })
        })
    }

    /// A run longer than the longest board side can never be completed
    fn fits_run(&self, win_length: usize) -> bool {
        win_length <= self.columns.max(self.rows)
    }

    fn run_from(
        &self,
        column: usize,
        row: usize,
        dc: i64,
        dr: i64,
        owner: &str,
        win_length: usize,
    ) -> bool {
        let Ok(win_length) = i64::try_from(win_length) else {
            return false;
        };
        (1..win_length).all(|step| {
            let c = column as i64 + step * dc;
            let r = row as i64 + step * dr;
            c >= 0 && r >= 0 && self.owner_at(c as usize, r as usize) == Some(owner)
        })
    }
}

impl fmt::Display for Board {
    /// Renders the top row first, each cell padded or truncated to 4 characters
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.rows).rev() {
            let line: Vec<String> = (0..self.columns)
                .map(|column| match self.owner_at(column, row) {
                    None => "_".repeat(CELL_WIDTH),
                    Some(name) => {
                        let short: String = name.chars().take(CELL_WIDTH).collect();
                        format!("{:<width$}", short, width = CELL_WIDTH)
                    }
                })
                .collect();
            writeln!(f, "[{}]", line.join(" "))?;
        }
        Ok(())
    }
}
