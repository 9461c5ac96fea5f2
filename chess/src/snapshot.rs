use crate::board::Board;
use crate::types::{Cell, Color, Coordinate, PieceKind, Position};

/// Read-only copy of the board contents, suitable for rendering
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    cells: [Cell; 64],
}

impl Snapshot {
    pub(crate) fn new(board: &Board) -> Snapshot {
        let mut cells = [Cell::EMPTY; 64];
        for (cell, pos) in cells.iter_mut().zip(Position::iter()) {
            *cell = board.cell(pos).unwrap_or(Cell::EMPTY);
        }
        Snapshot { cells }
    }

    /// Returns the kind and the color of the piece on `c`
    #[inline]
    pub fn get(&self, c: Coordinate) -> Option<(PieceKind, Color)> {
        self.cell(c).parts()
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn cell(&self, c: Coordinate) -> Cell {
        let pos = c.to_position();
        self.cells[(pos.row() as usize) * 8 + pos.column() as usize]
    }

    /// Same as [`Snapshot::get()`], but addressed by grid position
    ///
    /// Returns `None` for positions off the board.
    #[inline]
    pub fn get_position(&self, pos: Position) -> Option<(PieceKind, Color)> {
        self.cells[pos.index()?].parts()
    }

    /// Iterates over the rows from top (rank 8) to bottom (rank 1)
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(8)
    }
}
