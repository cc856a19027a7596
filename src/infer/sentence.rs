use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Cell, Error};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A logical statement about the board: exactly `num_mines` of `cells` are
/// mines.
///
/// Cells leave the sentence as soon as their status is known, so `cells`
/// only ever holds undetermined cells.
pub struct Sentence {
    /// Which cells
    cells: HashSet<Cell>,
    /// How many of them are mines
    num_mines: usize,
}
impl Sentence {
    pub fn new(
        num_mines: usize,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, Error> {
        let cells = cells.into_iter().collect::<HashSet<_>>();
        if num_mines > cells.len() {
            return Err(Error::Inconsistent("Sentence with more mines than cells"));
        }
        Ok(Self {
            cells,
            num_mines,
        })
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn num_mines(&self) -> usize {
        self.num_mines
    }

    /// Whether every cell has been resolved out of this sentence
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, if every one of them must be a mine.
    ///
    /// An empty sentence is never reported as "all mines".
    pub fn known_mines(&self) -> HashSet<Cell> {
        if self.num_mines == self.cells.len() && self.num_mines != 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// All cells, if none of them can be a mine.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.num_mines == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Drop a cell now known to be a mine, taking its mine with it.
    pub fn mark_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            // Saturates only for contradictory input
            self.num_mines = self.num_mines.saturating_sub(1);
        }
    }

    /// Drop a cell now known to be safe.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }

    /// Check if this sentence's cells are a subset of `other`'s cells.
    ///
    /// Equal cell sets are sub-sentences of each other, whatever the counts.
    pub fn is_subsentence_of(&self, other: &Self) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// If `other` is a sub-sentence of this one, return a new sentence
    /// covering the cells only this one mentions.
    pub fn subtract(&self, other: &Self) -> Result<Self, Error> {
        if !other.is_subsentence_of(self) {
            return Err(Error::Inconsistent("Subtraction of non-subsentence"));
        }
        let num_mines = self
            .num_mines
            .checked_sub(other.num_mines)
            .ok_or(Error::Inconsistent("Sub-sentence with more mines than its superset"))?;
        Self::new(num_mines, self.cells.difference(&other.cells).copied())
    }
}
impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.num_mines
        )
    }
}
