use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::internal_util::{all_cells, neighbours};
use crate::Cell;

/// Reasons an ASCII board description can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Board must have at least one row")]
    Empty,
    #[error("Board must be square (found line with length {found}, expected length {expected})")]
    NotSquare { found: usize, expected: usize },
    #[error("Invalid character '{character}' at ({row}, {col})")]
    InvalidCharacter {
        character: char,
        row: usize,
        col: usize,
    },
}

/// Ground truth for a square game board: where the mines are (no game logic!)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// The cells holding a mine
    mines: HashSet<Cell>,
    /// Side length of the board
    size: usize,
}
impl Board {
    /// Create a game board from an ASCII-encoded description, where:
    /// - `*` is a mine
    /// - `.` is a clear cell
    /// - `0`-`8` may be used in place of `.` (the digit itself is ignored)
    /// - Trailing or leading whitespace is ignored
    ///
    /// # Errors
    ///
    /// If the board is not square, is empty, or contains any other
    /// character, an error is returned.
    pub fn new(encoded: &str) -> Result<Self, BoardError> {
        let lines = encoded.trim().lines().map(str::trim).collect::<Vec<_>>();
        let size = lines.len();
        if size == 0 || lines[0].is_empty() {
            return Err(BoardError::Empty);
        }
        if let Some(line) = lines.iter().find(|l| l.chars().count() != size) {
            return Err(BoardError::NotSquare {
                found: line.chars().count(),
                expected: size,
            });
        }
        let mut mines = HashSet::new();
        for (row, line) in lines.into_iter().enumerate() {
            for (col, character) in line.chars().enumerate() {
                match character {
                    '*' => {
                        mines.insert(Cell::new(row, col));
                    },
                    '.' | '0'..='8' => (),
                    _ => {
                        return Err(BoardError::InvalidCharacter {
                            character,
                            row,
                            col,
                        });
                    },
                }
            }
        }
        Ok(Self {
            mines,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn total_cells(&self) -> usize {
        self.size * self.size
    }

    pub fn num_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Get a list of cells adjacent to the given cell
    pub fn adjacent(&self, cell: Cell) -> Vec<Cell> {
        neighbours(cell, self.size).collect()
    }

    /// How many of the cells adjacent to `cell` hold a mine
    pub fn adjacent_mines(&self, cell: Cell) -> usize {
        neighbours(cell, self.size)
            .filter(|neighbour| self.is_mine(*neighbour))
            .count()
    }
}
impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in all_cells(self.size) {
            f.write_str(if self.is_mine(cell) { "*" } else { "." })?;
            if cell.col + 1 == self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
