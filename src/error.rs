use thiserror::Error;

use crate::Cell;

/// Failures reported by the inference engine.
///
/// All of these stem from the caller breaking a precondition or feeding
/// observations that cannot all be true of the same board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Cell {cell} lies outside a {size}x{size} board")]
    OutOfBounds { cell: Cell, size: usize },
    #[error("Cell {0} is already known to be a mine")]
    KnownMine(Cell),
    #[error("Cell {0} is already known to be safe")]
    KnownSafe(Cell),
    /// The knowledge base cannot hold a sentence implied by the input.
    #[error("Inconsistent knowledge: {0}")]
    Inconsistent(&'static str),
}
