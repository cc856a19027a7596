//! Reveal loop joining a ground-truth [`Board`] and a [`KnowledgeBase`].
//!
//! Every cell the game reveals is reported to the knowledge base together
//! with its true adjacent-mine count, so the engine only ever sees
//! observations that are consistent with the board.
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use crate::internal_util::all_cells;
use crate::util::Board;
use crate::{Cell, Error, KnowledgeBase, Move};

/// What happened when a cell was dug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dig {
    /// The cell held a mine; the game is lost
    Exploded,
    /// The cell was clear; this many cells were newly revealed (more than
    /// one when a zero-count region was opened up)
    Revealed(usize),
}

/// Summary of a finished game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub won: bool,
    /// Moves proven safe before they were played
    pub safe_moves: usize,
    /// Moves played without proof
    pub guesses: usize,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    knowledge: KnowledgeBase,
    revealed: HashSet<Cell>,
    /// The mine that ended the game, if any
    exploded: Option<Cell>,
}
impl Game {
    /// # Errors
    ///
    /// If `board` and `knowledge` describe boards of different sizes.
    pub fn new(board: Board, knowledge: KnowledgeBase) -> Result<Self, Error> {
        if board.size() != knowledge.size() {
            return Err(Error::Inconsistent(
                "Board and knowledge base have different sizes",
            ));
        }
        Ok(Self {
            board,
            knowledge,
            revealed: HashSet::new(),
            exploded: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn revealed(&self) -> &HashSet<Cell> {
        &self.revealed
    }

    pub fn is_lost(&self) -> bool {
        self.exploded.is_some()
    }

    /// Every clear cell has been revealed without hitting a mine
    pub fn is_won(&self) -> bool {
        !self.is_lost()
            && self.revealed.len() + self.board.num_mines() == self.board.total_cells()
    }

    pub fn is_over(&self) -> bool {
        self.is_lost() || self.is_won()
    }

    /// Dig at `cell`, revealing it and, if it has no adjacent mines, the
    /// whole connected zero region around it.
    ///
    /// Each revealed cell is recorded as an observation, and a cell only
    /// counts as revealed once the knowledge base has accepted it. Digging
    /// after the game is lost reveals nothing.
    pub fn dig(&mut self, cell: Cell) -> Result<Dig, Error> {
        if self.is_lost() {
            return Ok(Dig::Revealed(0));
        }
        if !self.board.contains(cell) {
            return Err(Error::OutOfBounds {
                cell,
                size: self.board.size(),
            });
        }
        if self.board.is_mine(cell) {
            info!(%cell, "hit a mine");
            self.exploded = Some(cell);
            return Ok(Dig::Exploded);
        }

        let mut newly_revealed = 0;
        let mut pending = vec![cell];
        while let Some(next) = pending.pop() {
            if self.revealed.contains(&next) {
                continue;
            }
            let count = self.board.adjacent_mines(next);
            let observed = self.knowledge.record_observation(next, count);
            // A contradiction found while deducing still keeps the move
            if self.knowledge.moves_made().contains(&next) {
                self.revealed.insert(next);
                newly_revealed += 1;
            }
            observed?;
            if count == 0 {
                pending.extend(
                    self.board
                        .adjacent(next)
                        .into_iter()
                        .filter(|neighbour| !self.revealed.contains(neighbour)),
                );
            }
        }
        debug!(%cell, newly_revealed, "dug");
        Ok(Dig::Revealed(newly_revealed))
    }

    /// Ask the knowledge base for a move and play it.
    ///
    /// `None` if the game is over or no move is left.
    pub fn step(&mut self) -> Result<Option<(Move, Dig)>, Error> {
        if self.is_over() {
            return Ok(None);
        }
        let Some(next) = self.knowledge.next_move() else {
            return Ok(None);
        };
        let dig = self.dig(next.cell())?;
        Ok(Some((next, dig)))
    }

    /// Let the knowledge base play until the game is won or lost
    pub fn autoplay(&mut self) -> Result<Outcome, Error> {
        let mut outcome = Outcome::default();
        while let Some((next, _)) = self.step()? {
            match next {
                Move::Safe(_) => outcome.safe_moves += 1,
                Move::Guess(_) => outcome.guesses += 1,
            }
        }
        outcome.won = self.is_won();
        info!(
            won = outcome.won,
            safe_moves = outcome.safe_moves,
            guesses = outcome.guesses,
            "game over"
        );
        Ok(outcome)
    }
}
impl fmt::Display for Game {
    /// Revealed cells show their count, known mines `F`, the mine that ended
    /// the game `*`, anything else `-`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.board.size();
        for cell in all_cells(size) {
            if self.exploded == Some(cell) {
                f.write_str("*")?;
            } else if self.revealed.contains(&cell) {
                write!(f, "{}", self.board.adjacent_mines(cell))?;
            } else if self.knowledge.mines().contains(&cell) {
                f.write_str("F")?;
            } else {
                f.write_str("-")?;
            }
            if cell.col + 1 == size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
