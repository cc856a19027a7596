use std::cmp::min;

use itertools::iproduct;

use crate::Cell;

/// Cells sharing an edge or a corner with `cell` on a `size`x`size` board,
/// excluding `cell` itself.
///
/// `size` must be at least 1.
pub(crate) fn neighbours(cell: Cell, size: usize) -> impl Iterator<Item = Cell> {
    let rows = cell.row.saturating_sub(1)..=min(cell.row + 1, size - 1);
    let cols = cell.col.saturating_sub(1)..=min(cell.col + 1, size - 1);
    iproduct!(rows, cols)
        .map(|(row, col)| Cell::new(row, col))
        .filter(move |&other| other != cell)
}

/// Every cell of a `size`x`size` board, row-major.
pub(crate) fn all_cells(size: usize) -> impl Iterator<Item = Cell> {
    iproduct!(0..size, 0..size).map(|(row, col)| Cell::new(row, col))
}
