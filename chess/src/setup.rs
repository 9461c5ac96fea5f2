//! Starting positions for a match

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{Cell, Color, Coordinate, File, PieceKind, Position, Rank};

use thiserror::Error;

/// Setup validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coordinate),
    /// Turn number must start from 1
    #[error("invalid turn number {0}")]
    InvalidTurn(u32),
    /// King of the side which is not to move is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Raw description of a position
///
/// Setup is not validated and may contain an invalid position. It can be used to build a
/// position programmatically, and then converted to a [`Match`](crate::game::Match) via
/// [`Match::from_setup()`](crate::game::Match::from_setup).
///
/// # Example
///
/// ```
/// # use rookery::{Setup, Match, Cell, Color, PieceKind, File, Rank};
/// #
/// let mut setup = Setup::empty();
/// setup.put2(File::E, Rank::R1, Cell::from_parts(Color::White, PieceKind::King));
/// setup.put2(File::E, Rank::R8, Cell::from_parts(Color::Black, PieceKind::King));
/// setup.put2(File::A, Rank::R7, Cell::from_parts(Color::White, PieceKind::Pawn));
///
/// let game = Match::from_setup(&setup).unwrap();
/// assert_eq!(game.turn(), 1);
/// assert_eq!(game.side(), Color::White);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Setup {
    /// Contents of the board, indexed by [`Position::index()`]
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
    /// Turn number, starting from 1
    pub turn: u32,
    /// Squares whose pieces are considered to have already moved once
    ///
    /// Such pieces cannot castle, and pawns among them cannot make a double move.
    pub moved: Bitboard,
}

impl Setup {
    /// Returns a setup without any pieces
    pub const fn empty() -> Setup {
        Setup {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            turn: 1,
            moved: Bitboard::EMPTY,
        }
    }

    /// Returns the standard initial position
    pub fn initial() -> Setup {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut res = Setup::empty();
        for color in [Color::White, Color::Black] {
            for (file, kind) in File::iter().zip(BACK_RANK) {
                res.put2(file, geometry::home_rank(color), Cell::from_parts(color, kind));
                res.put2(
                    file,
                    geometry::pawn_rank(color),
                    Cell::from_parts(color, PieceKind::Pawn),
                );
            }
        }
        res
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coordinate) -> Cell {
        self.cells[Self::slot(c)]
    }

    /// Puts `cell` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coordinate, cell: Cell) {
        self.cells[Self::slot(c)] = cell;
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coordinate::from_parts(file, rank), cell);
    }

    /// Marks the piece on `c` as already moved
    #[inline]
    pub fn set_moved(&mut self, c: Coordinate) {
        self.moved.set(c.to_position());
    }

    fn slot(c: Coordinate) -> usize {
        let pos = c.to_position();
        (pos.row() as usize) * 8 + pos.column() as usize
    }

    /// Iterates over occupied squares together with their contents
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        Position::iter()
            .zip(self.cells.iter().copied())
            .filter(|(_, cell)| cell.is_occupied())
    }

    /// Checks the constraints that don't depend on piece movement
    pub(crate) fn validate_static(&self) -> Result<(), ValidateError> {
        if self.turn == 0 {
            return Err(ValidateError::InvalidTurn(self.turn));
        }
        for color in [Color::White, Color::Black] {
            let of_color = move || self.occupied().filter(move |(_, c)| c.color() == Some(color));
            if of_color().count() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            match of_color()
                .filter(|(_, c)| c.kind() == Some(PieceKind::King))
                .count()
            {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }
        for (pos, cell) in self.occupied() {
            let row = pos.row() as usize;
            if cell.kind() == Some(PieceKind::Pawn)
                && (row == Rank::R1.index() || row == Rank::R8.index())
            {
                // Position on the board always converts into a coordinate
                if let Ok(c) = Coordinate::from_position(pos) {
                    return Err(ValidateError::InvalidPawn(c));
                }
            }
        }
        Ok(())
    }
}

impl Default for Setup {
    #[inline]
    fn default() -> Setup {
        Setup::empty()
    }
}
