use std::collections::HashSet;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::infer::Sentence;
use crate::internal_util::{all_cells, neighbours};
use crate::{Cell, Error};

/// A move suggested by the [`KnowledgeBase`]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move {
    /// The cell is proven to be free of mines
    Safe(Cell),
    /// Nothing is proven safe; the cell is a random one not known to be a mine
    Guess(Cell),
}
impl Move {
    pub fn cell(self) -> Cell {
        match self {
            Self::Safe(cell) | Self::Guess(cell) => cell,
        }
    }
}

/// Everything the player has learned about one board.
///
/// Holds the cells already revealed, the cells whose status is settled, and
/// an append-only list of [`Sentence`]s. Known mines and known safes never
/// overlap, and none of the sets (nor the sentence list) ever shrink.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    /// Side length of the (square) board
    size: usize,
    moves_made: HashSet<Cell>,
    mines: HashSet<Cell>,
    safes: HashSet<Cell>,
    sentences: Vec<Sentence>,
    /// Source of randomness for guesses
    rng: ChaCha8Rng,
}
impl KnowledgeBase {
    /// Create an empty knowledge base for a `size`x`size` board, guessing
    /// with an entropy-seeded generator.
    pub fn new(size: usize) -> Result<Self, Error> {
        Self::from_rng(size, ChaCha8Rng::from_entropy())
    }

    /// Like [`KnowledgeBase::new`], but guesses are reproducible for a given
    /// `seed`.
    pub fn with_seed(size: usize, seed: u64) -> Result<Self, Error> {
        Self::from_rng(size, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(size: usize, rng: ChaCha8Rng) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::EmptyBoard);
        }
        Ok(Self {
            size,
            moves_made: HashSet::new(),
            mines: HashSet::new(),
            safes: HashSet::new(),
            sentences: Vec::new(),
            rng,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    /// Every sentence learned so far, oldest first
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    /// Whether the status of every cell on the board is known
    pub fn is_resolved(&self) -> bool {
        self.mines.len() + self.safes.len() == self.size * self.size
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), Error> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                cell,
                size: self.size,
            })
        }
    }

    /// Record that `cell` is a mine, and strike it from every sentence.
    ///
    /// Fails without changing anything if `cell` is off the board, already
    /// known to be safe, or sits in a sentence that has no mines left.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<(), Error> {
        self.check_bounds(cell)?;
        if self.safes.contains(&cell) {
            return Err(Error::KnownSafe(cell));
        }
        if self
            .sentences
            .iter()
            .any(|s| s.num_mines() == 0 && s.cells().contains(&cell))
        {
            return Err(Error::Inconsistent("Mine in a sentence with no mines left"));
        }
        if self.mines.insert(cell) {
            trace!(%cell, "mine");
        }
        for sentence in &mut self.sentences {
            sentence.mark_mine(cell);
        }
        Ok(())
    }

    /// Record that `cell` is safe, and strike it from every sentence.
    ///
    /// Fails without changing anything if `cell` is off the board, already
    /// known to be a mine, or sits in a sentence whose cells must all be
    /// mines.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<(), Error> {
        self.check_bounds(cell)?;
        if self.mines.contains(&cell) {
            return Err(Error::KnownMine(cell));
        }
        if self
            .sentences
            .iter()
            .any(|s| s.num_mines() == s.cells().len() && s.cells().contains(&cell))
        {
            return Err(Error::Inconsistent("Safe cell in a sentence of only mines"));
        }
        if self.safes.insert(cell) {
            trace!(%cell, "safe");
        }
        for sentence in &mut self.sentences {
            sentence.mark_safe(cell);
        }
        Ok(())
    }

    /// Learn from a revealed cell: `cell` is safe and `count` of its
    /// neighbours are mines.
    ///
    /// The new sentence covers the neighbours whose status is still open.
    /// One deduction sweep runs over every sentence, then the new sentence is
    /// checked against every other for subset inference. Sentences derived
    /// by subset inference are swept on the next observation (or by an
    /// explicit [`KnowledgeBase::deduce`]).
    ///
    /// # Errors
    ///
    /// `cell` off the board, a known mine, or a `count` that the already
    /// known neighbours make impossible; nothing is recorded in these cases.
    /// Contradictions found while deducing are reported as well, and leave
    /// the knowledge gathered up to that point in place.
    pub fn record_observation(&mut self, cell: Cell, count: usize) -> Result<(), Error> {
        self.check_bounds(cell)?;
        if self.mines.contains(&cell) {
            return Err(Error::KnownMine(cell));
        }

        let mut known_mines = 0;
        let mut undetermined = Vec::new();
        for neighbour in neighbours(cell, self.size) {
            if self.mines.contains(&neighbour) {
                known_mines += 1;
            } else if !self.safes.contains(&neighbour) {
                undetermined.push(neighbour);
            }
        }
        let num_mines = count
            .checked_sub(known_mines)
            .filter(|&n| n <= undetermined.len())
            .ok_or(Error::Inconsistent(
                "Observed count disagrees with known neighbours",
            ))?;
        let sentence = Sentence::new(num_mines, undetermined)?;
        debug!(%cell, count, %sentence, "observation");

        self.mark_safe(cell)?;
        self.moves_made.insert(cell);
        self.sentences.push(sentence);
        let newest = self.sentences.len() - 1;

        self.deduce()?;
        self.infer_subsets(newest)
    }

    /// Sweep the sentence list once, marking the cells of every all-mines
    /// sentence as mines and of every all-safe sentence as safe.
    ///
    /// Returns whether anything new was learned. Deductions made late in the
    /// sweep can enable sentences visited earlier; those wait for the next
    /// sweep.
    pub fn deduce(&mut self) -> Result<bool, Error> {
        let known = self.mines.len() + self.safes.len();
        // Indexed: every mark rewrites the sentences in place
        let mut index = 0;
        while index < self.sentences.len() {
            for cell in self.sentences[index].known_mines() {
                self.mark_mine(cell)?;
            }
            for cell in self.sentences[index].known_safes() {
                self.mark_safe(cell)?;
            }
            index += 1;
        }
        Ok(self.mines.len() + self.safes.len() > known)
    }

    /// For every sentence whose cells include all of the sentence at
    /// `newest`, append the difference between the two.
    ///
    /// Only pairs involving `newest` are considered, and only when both
    /// sentences still hold a mine.
    fn infer_subsets(&mut self, newest: usize) -> Result<(), Error> {
        let subsentence = self.sentences[newest].clone();
        if subsentence.num_mines() == 0 {
            return Ok(());
        }
        // Derived sentences are appended during the scan and visited too
        let mut index = 0;
        while index < self.sentences.len() {
            let sentence = &self.sentences[index];
            if sentence.num_mines() > 0
                && subsentence.is_subsentence_of(sentence)
                && *sentence != subsentence
            {
                let derived = sentence.subtract(&subsentence)?;
                trace!(%derived, "subset inference");
                self.sentences.push(derived);
            }
            index += 1;
        }
        Ok(())
    }

    /// A cell known to be safe that has not been revealed yet.
    ///
    /// Any such cell would do; the first in row-major order is returned so
    /// that play is reproducible.
    pub fn next_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).min().copied()
    }

    /// A uniformly random cell that is neither revealed nor a known mine.
    ///
    /// `None` once every cell is one or the other.
    pub fn next_guess_move(&mut self) -> Option<Cell> {
        let candidates = all_cells(self.size)
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect_vec();
        let guess = candidates.choose(&mut self.rng).copied();
        if let Some(cell) = guess {
            debug!(%cell, candidates = candidates.len(), "guess");
        }
        guess
    }

    /// A safe move if one is known, a guess otherwise
    pub fn next_move(&mut self) -> Option<Move> {
        self.next_safe_move()
            .map(Move::Safe)
            .or_else(|| self.next_guess_move().map(Move::Guess))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cells(coords: &[(usize, usize)]) -> HashSet<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    fn sentence(num_mines: usize, coords: &[(usize, usize)]) -> Sentence {
        Sentence::new(num_mines, cells(coords)).unwrap()
    }

    #[test]
    fn rejects_empty_board() {
        assert_eq!(KnowledgeBase::new(0).unwrap_err(), Error::EmptyBoard);
    }

    #[test]
    fn zero_observation_marks_all_neighbours_safe() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.record_observation(Cell::new(1, 1), 0).unwrap();

        let everything = all_cells(3).collect::<HashSet<_>>();
        assert_eq!(kb.safes(), &everything);
        assert!(kb.mines().is_empty());
        assert_eq!(kb.moves_made(), &cells(&[(1, 1)]));
        assert!(kb.is_resolved());
        assert_eq!(kb.sentences(), &[sentence(0, &[])]);
    }

    #[test]
    fn observation_builds_sentence_over_open_neighbours() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.record_observation(Cell::new(1, 1), 1).unwrap();
        assert_eq!(
            kb.sentences(),
            &[sentence(
                1,
                &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)],
            )],
        );
        assert_eq!(kb.safes(), &cells(&[(1, 1)]));
    }

    #[test]
    fn known_neighbours_are_left_out_of_new_sentences() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.mark_mine(Cell::new(0, 0)).unwrap();
        kb.mark_safe(Cell::new(0, 1)).unwrap();
        kb.record_observation(Cell::new(1, 0), 2).unwrap();
        // (1, 0) sees (0, 0) (mine), (0, 1) (safe), (1, 1), (2, 0), (2, 1)
        assert_eq!(kb.sentences(), &[sentence(1, &[(1, 1), (2, 0), (2, 1)])]);
    }

    #[test]
    fn single_mine_resolved_by_safe_moves() {
        // Mine at (0, 0); counts are the true neighbour counts
        let count = |cell: Cell| usize::from(cell.row <= 1 && cell.col <= 1);
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.record_observation(Cell::new(1, 1), 1).unwrap();
        kb.record_observation(Cell::new(2, 2), 0).unwrap();
        assert_eq!(kb.safes(), &cells(&[(1, 1), (1, 2), (2, 1), (2, 2)]));
        assert!(kb.mines().is_empty());
        assert_eq!(
            kb.sentences()[0],
            sentence(1, &[(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)]),
        );

        while let Some(cell) = kb.next_safe_move() {
            kb.record_observation(cell, count(cell)).unwrap();
        }
        assert_eq!(kb.mines(), &cells(&[(0, 0)]));
        assert_eq!(kb.safes().len(), 8);
        assert!(kb.is_resolved());
    }

    #[test]
    fn subset_inference_from_newest_sentence() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1), (0, 2)]));
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1)]));
        kb.infer_subsets(1).unwrap();
        assert_eq!(kb.sentences()[2], sentence(0, &[(0, 2)]));
        assert_eq!(kb.sentences().len(), 3);

        assert!(kb.deduce().unwrap());
        assert_eq!(kb.safes(), &cells(&[(0, 2)]));
    }

    #[test]
    fn subset_inference_ignores_older_pairs() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1)]));
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1), (0, 2)]));
        kb.sentences.push(sentence(1, &[(2, 0), (2, 1)]));
        kb.infer_subsets(2).unwrap();
        assert_eq!(kb.sentences().len(), 3);
    }

    #[test]
    fn subset_inference_skips_equal_and_mine_free_sentences() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.sentences.push(sentence(0, &[(0, 0), (0, 1), (0, 2)]));
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1)]));
        kb.sentences.push(sentence(1, &[(0, 0), (0, 1)]));
        kb.infer_subsets(2).unwrap();
        assert_eq!(kb.sentences().len(), 3);
    }

    #[test]
    fn subset_sentences_wait_for_the_next_sweep() {
        // Mine at (1, 0)
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.record_observation(Cell::new(0, 1), 1).unwrap();
        kb.record_observation(Cell::new(0, 0), 1).unwrap();
        assert_eq!(
            kb.sentences(),
            &[
                sentence(1, &[(0, 2), (1, 0), (1, 1), (1, 2)]),
                sentence(1, &[(1, 0), (1, 1)]),
                sentence(0, &[(0, 2), (1, 2)]),
            ],
        );
        assert_eq!(kb.safes(), &cells(&[(0, 0), (0, 1)]));

        assert!(kb.deduce().unwrap());
        assert_eq!(kb.safes(), &cells(&[(0, 0), (0, 1), (0, 2), (1, 2)]));
        assert!(!kb.deduce().unwrap());
    }

    #[test]
    fn invalid_observations_change_nothing() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        assert_eq!(
            kb.record_observation(Cell::new(3, 0), 0),
            Err(Error::OutOfBounds {
                cell: Cell::new(3, 0),
                size: 3,
            }),
        );
        assert_eq!(
            kb.record_observation(Cell::new(0, 0), 4),
            Err(Error::Inconsistent(
                "Observed count disagrees with known neighbours"
            )),
        );

        kb.mark_mine(Cell::new(0, 0)).unwrap();
        assert_eq!(
            kb.record_observation(Cell::new(0, 0), 0),
            Err(Error::KnownMine(Cell::new(0, 0))),
        );
        assert_eq!(
            kb.record_observation(Cell::new(0, 1), 0),
            Err(Error::Inconsistent(
                "Observed count disagrees with known neighbours"
            )),
        );
        assert!(kb.moves_made().is_empty());
        assert!(kb.safes().is_empty());
        assert!(kb.sentences().is_empty());
    }

    #[test]
    fn off_board_marks_change_nothing() {
        let mut kb = KnowledgeBase::with_seed(2, 0).unwrap();
        for col in 0..4 {
            let cell = Cell::new(9, col);
            let off_board = Err(Error::OutOfBounds {
                cell,
                size: 2,
            });
            assert_eq!(kb.mark_safe(cell), off_board);
            assert_eq!(kb.mark_mine(cell), off_board);
        }
        assert!(kb.safes().is_empty());
        assert!(kb.mines().is_empty());
        assert!(!kb.is_resolved());
        assert_eq!(kb.next_safe_move(), None);
    }

    #[test]
    fn marks_contradicting_a_sentence_are_refused() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.sentences.push(sentence(0, &[(0, 2), (1, 2)]));
        kb.sentences.push(sentence(1, &[(2, 0)]));
        assert_eq!(
            kb.mark_mine(Cell::new(0, 2)),
            Err(Error::Inconsistent("Mine in a sentence with no mines left")),
        );
        assert_eq!(
            kb.mark_safe(Cell::new(2, 0)),
            Err(Error::Inconsistent("Safe cell in a sentence of only mines")),
        );
        assert!(kb.mines().is_empty());
        assert!(kb.safes().is_empty());
        assert_eq!(kb.sentences()[0], sentence(0, &[(0, 2), (1, 2)]));
        assert_eq!(kb.sentences()[1], sentence(1, &[(2, 0)]));

        // Agreeing marks still go through
        kb.mark_safe(Cell::new(0, 2)).unwrap();
        kb.mark_mine(Cell::new(2, 0)).unwrap();
        assert_eq!(kb.sentences()[0], sentence(0, &[(1, 2)]));
        assert_eq!(kb.sentences()[1], sentence(0, &[]));
    }

    #[test]
    fn mines_and_safes_never_overlap() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.mark_mine(Cell::new(0, 0)).unwrap();
        kb.mark_safe(Cell::new(0, 1)).unwrap();
        assert_eq!(
            kb.mark_safe(Cell::new(0, 0)),
            Err(Error::KnownMine(Cell::new(0, 0)))
        );
        assert_eq!(
            kb.mark_mine(Cell::new(0, 1)),
            Err(Error::KnownSafe(Cell::new(0, 1)))
        );
        assert!(kb.mines().is_disjoint(kb.safes()));

        // Marking twice is the same as marking once
        kb.mark_mine(Cell::new(0, 0)).unwrap();
        kb.mark_safe(Cell::new(0, 1)).unwrap();
        assert_eq!(kb.mines(), &cells(&[(0, 0)]));
        assert_eq!(kb.safes(), &cells(&[(0, 1)]));
    }

    #[test]
    fn next_safe_move_skips_revealed_cells() {
        let mut kb = KnowledgeBase::with_seed(3, 0).unwrap();
        kb.mark_safe(Cell::new(0, 0)).unwrap();
        kb.moves_made.insert(Cell::new(0, 0));
        assert_eq!(kb.next_safe_move(), None);

        kb.mark_safe(Cell::new(0, 1)).unwrap();
        assert_eq!(kb.next_safe_move(), Some(Cell::new(0, 1)));
        assert_eq!(kb.next_move(), Some(Move::Safe(Cell::new(0, 1))));
    }

    #[test]
    fn guesses_avoid_mines_and_revealed_cells() {
        // 2x2 board with its only mine at (0, 0)
        let mut kb = KnowledgeBase::with_seed(2, 7).unwrap();
        kb.mark_mine(Cell::new(0, 0)).unwrap();
        for _ in 0..3 {
            let guess = kb.next_guess_move().unwrap();
            assert!(!kb.mines().contains(&guess));
            assert!(!kb.moves_made().contains(&guess));
            kb.record_observation(guess, 1).unwrap();
        }
        assert_eq!(kb.next_guess_move(), None);
        assert_eq!(kb.next_move(), None);
    }

    #[test]
    fn seeded_guesses_are_reproducible() {
        let mut a = KnowledgeBase::with_seed(8, 42).unwrap();
        let mut b = KnowledgeBase::with_seed(8, 42).unwrap();
        for _ in 0..10 {
            assert_eq!(a.next_guess_move(), b.next_guess_move());
        }
    }
}
