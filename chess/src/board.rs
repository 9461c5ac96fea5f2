//! Board and pieces on it

use crate::types::{Cell, Color, PieceKind, Position};

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of pieces a board can ever hold
///
/// A valid position has at most 32 pieces, and each of at most 16 pawns may be replaced by
/// a new piece upon promotion.
pub const MAX_PIECES: usize = 48;

/// Error accessing a board square
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BoardError {
    /// Position lies outside the 8x8 grid
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),
    /// Square already holds a piece
    #[error("position {0} is already occupied")]
    CellOccupied(Position),
}

/// Handle of a piece owned by a [`Board`]
///
/// Handles stay valid for the whole lifetime of the board, including the time the piece spends
/// off the board after being captured.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u8);

impl PieceId {
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    move_count: u32,
    position: Option<Position>,
}

impl Piece {
    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of moves made by this piece
    #[inline]
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Current square of the piece, or `None` if it is not on the board
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::from_parts(self.color, self.kind)
    }
}

/// 8x8 grid of pieces
///
/// The board owns every piece it was ever given. Each square refers to at most one piece, and a
/// piece on the board always records the square that refers to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<PieceId>; 64],
    pieces: ArrayVec<Piece, MAX_PIECES>,
}

impl Board {
    /// Returns an empty board without any pieces
    pub fn new() -> Board {
        Board {
            cells: [None; 64],
            pieces: ArrayVec::new(),
        }
    }

    fn slot(pos: Position) -> Result<usize, BoardError> {
        pos.index().ok_or(BoardError::OutOfBounds(pos))
    }

    /// Returns the piece on the square `pos`
    #[inline]
    pub fn get(&self, pos: Position) -> Result<Option<PieceId>, BoardError> {
        Ok(self.cells[Self::slot(pos)?])
    }

    /// Puts the piece `id` on the square `pos`
    ///
    /// # Panics
    ///
    /// Panics if the piece is already on the board.
    pub fn place(&mut self, id: PieceId, pos: Position) -> Result<(), BoardError> {
        let slot = Self::slot(pos)?;
        if self.cells[slot].is_some() {
            return Err(BoardError::CellOccupied(pos));
        }
        let piece = &mut self.pieces[id.index()];
        assert!(piece.position.is_none(), "piece {:?} is already placed", id);
        piece.position = Some(pos);
        self.cells[slot] = Some(id);
        Ok(())
    }

    /// Takes the piece from the square `pos`
    ///
    /// Returns `Ok(None)` if the square is empty.
    pub fn remove(&mut self, pos: Position) -> Result<Option<PieceId>, BoardError> {
        let slot = Self::slot(pos)?;
        let id = self.cells[slot].take();
        if let Some(id) = id {
            self.pieces[id.index()].position = None;
        }
        Ok(id)
    }

    #[inline]
    pub fn is_occupied(&self, pos: Position) -> Result<bool, BoardError> {
        Ok(self.get(pos)?.is_some())
    }

    /// Returns the piece with handle `id`
    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Returns the piece on the square `pos`
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Result<Option<&Piece>, BoardError> {
        Ok(self.get(pos)?.map(|id| self.piece(id)))
    }

    /// Returns the contents of the square `pos` in packed form
    #[inline]
    pub fn cell(&self, pos: Position) -> Result<Cell, BoardError> {
        Ok(self.piece_at(pos)?.map_or(Cell::EMPTY, Piece::cell))
    }

    /// Iterates over all the pieces owned by the board, including the ones not on the board
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .map(|(idx, piece)| (PieceId(idx as u8), piece))
    }

    /// Creates a new piece which is not placed yet
    ///
    /// # Panics
    ///
    /// Panics if the board already owns [`MAX_PIECES`] pieces.
    pub(crate) fn create(&mut self, kind: PieceKind, color: Color, move_count: u32) -> PieceId {
        let id = PieceId(self.pieces.len() as u8);
        self.pieces.push(Piece {
            kind,
            color,
            move_count,
            position: None,
        });
        id
    }

    /// Destroys the piece created last
    ///
    /// The piece must not be on the board.
    pub(crate) fn discard(&mut self, id: PieceId) {
        assert_eq!(id.index() + 1, self.pieces.len(), "only the last piece can be discarded");
        let piece = self.pieces.pop();
        assert!(matches!(piece, Some(Piece { position: None, .. })));
    }

    /// Takes the piece from `pos`, which must be on the board
    pub(crate) fn take(&mut self, pos: Position) -> Option<PieceId> {
        match self.remove(pos) {
            Ok(id) => id,
            Err(e) => panic!("cannot take piece: {}", e),
        }
    }

    /// Puts the piece to `pos`, which must be on the board and empty
    pub(crate) fn put(&mut self, id: PieceId, pos: Position) {
        if let Err(e) = self.place(id, pos) {
            panic!("cannot put piece: {}", e);
        }
    }

    pub(crate) fn add_move(&mut self, id: PieceId) {
        self.pieces[id.index()].move_count += 1;
    }

    pub(crate) fn sub_move(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        assert!(piece.move_count > 0, "move count underflow");
        piece.move_count -= 1;
    }

    /// Verifies that squares and piece positions agree with each other
    ///
    /// # Panics
    ///
    /// Panics if they don't.
    #[cfg(any(test, feature = "selftest"))]
    pub(crate) fn audit(&self) {
        for (pos, &cell) in Position::iter().zip(self.cells.iter()) {
            if let Some(id) = cell {
                assert_eq!(
                    self.piece(id).position,
                    Some(pos),
                    "square {} refers to piece {:?} located elsewhere",
                    pos,
                    id
                );
            }
        }
        for (id, piece) in self.pieces() {
            if let Some(pos) = piece.position {
                assert_eq!(
                    self.get(pos),
                    Ok(Some(id)),
                    "piece {:?} is not referred by its square {}",
                    id,
                    pos
                );
            }
        }
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::new()
    }
}
