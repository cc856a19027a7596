//! Knowledge-based minesweeper player.
//!
//! The engine ([`KnowledgeBase`]) is fed one observation per revealed cell,
//! i.e. the cell and how many of its neighbours are mines, and keeps a list
//! of [`Sentence`]s of the form "exactly N of these cells are mines". Every
//! observation triggers a sweep of direct deductions (all-mines / all-safe
//! sentences) followed by subset inference against the newest sentence.
//!
//! [`util::Board`] and [`game::Game`] provide a deterministic ground-truth
//! board and a reveal loop for driving the engine end to end.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod error;
pub mod game;
mod infer;
mod internal_util;
pub mod util;

pub use error::Error;
pub use infer::{KnowledgeBase, Move, Sentence};

/// A cell on a square board, addressed by 0-indexed row and column.
///
/// Ordered row-major, so sorted collections of cells read like the board.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}
impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
        }
    }
}
impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
