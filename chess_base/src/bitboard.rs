use crate::types::Position;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;
use std::iter::{FromIterator, IntoIterator};

/// Set of board positions, one bit per square
///
/// Bit `row * 8 + column` stands for the position `(row, column)`. Only valid positions can
/// be stored.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Returns a set containing only `pos`, or an empty set if `pos` is off the board
    pub const fn from_position(pos: Position) -> Bitboard {
        match pos.index() {
            Some(idx) => Bitboard(1_u64 << idx),
            None => Bitboard::EMPTY,
        }
    }

    pub const fn with(self, pos: Position) -> Bitboard {
        Bitboard(self.0 | Self::from_position(pos).0)
    }

    pub fn set(&mut self, pos: Position) {
        *self = self.with(pos);
    }

    pub const fn has(&self, pos: Position) -> bool {
        (self.0 & Self::from_position(pos).0) != 0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> Iter {
        Iter(self.0)
    }
}

impl From<Bitboard> for u64 {
    fn from(b: Bitboard) -> u64 {
        b.0
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in 0..8 {
            if row != 0 {
                write!(f, "/")?;
            }
            write!(f, "{:08b}", ((self.0 >> (row * 8)) & 0xff).reverse_bits() >> 56)?;
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        Some(Position::from_index(bit as usize))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Position;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Position> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Bitboard {
        iter.into_iter()
            .fold(Bitboard::EMPTY, |acc, pos| acc.with(pos))
    }
}
