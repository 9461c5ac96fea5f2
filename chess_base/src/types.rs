use std::fmt;
use std::hint;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("file {0:?} is outside a..h")]
    InvalidFile(char),
    #[error("rank {0} is outside 1..8")]
    InvalidRank(u8),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
    #[error("position {0} is not on the board")]
    OffBoard(Position),
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => File::A,
            1 => File::B,
            2 => File::C,
            3 => File::D,
            4 => File::E,
            5 => File::F,
            6 => File::G,
            7 => File::H,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(Self::from_index((u32::from(c) - u32::from('a')) as usize)),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Rank of the board
///
/// Ranks are ordered top-down, so the index of a rank is the grid row it occupies:
/// `Rank::R8` is row 0 and `Rank::R1` is row 7.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R8 = 0,
    R7 = 1,
    R6 = 2,
    R5 = 3,
    R4 = 4,
    R3 = 5,
    R2 = 6,
    R1 = 7,
}

impl Rank {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Rank::R8,
            1 => Rank::R7,
            2 => Rank::R6,
            3 => Rank::R5,
            4 => Rank::R4,
            5 => Rank::R3,
            6 => Rank::R2,
            7 => Rank::R1,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    /// Returns the rank with human-facing number `num` (from 1 to 8)
    pub const fn from_number(num: u8) -> Option<Self> {
        match num {
            1..=8 => Some(Self::from_index((8 - num) as usize)),
            _ => None,
        }
    }

    pub const fn number(&self) -> u8 {
        8 - *self as u8
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Self::from_number((u32::from(c) - u32::from('0')) as u8),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'0' + self.number()) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Zero-based grid position
///
/// Row 0 is the top of the grid (rank 8), column 0 is file `a`. The position is not
/// required to lie on the board: it may be shifted off the edge while walking a ray, and
/// [`Position::is_valid()`] tells whether it is still on the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    row: i8,
    column: i8,
}

impl Position {
    pub const fn new(row: i8, column: i8) -> Position {
        Position { row, column }
    }

    pub const fn from_parts(file: File, rank: Rank) -> Position {
        Position::new(rank.index() as i8, file.index() as i8)
    }

    pub const fn from_index(val: usize) -> Position {
        assert!(val < 64, "position index must be between 0 and 63");
        Position::new((val >> 3) as i8, (val & 7) as i8)
    }

    pub const fn row(&self) -> i8 {
        self.row
    }

    pub const fn column(&self) -> i8 {
        self.column
    }

    pub const fn is_valid(&self) -> bool {
        self.row >= 0 && self.row < 8 && self.column >= 0 && self.column < 8
    }

    /// Returns the cell index (`row * 8 + column`) if the position is on the board
    pub const fn index(&self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        Some(((self.row as usize) << 3) | self.column as usize)
    }

    pub const fn shift(self, delta_row: i8, delta_column: i8) -> Position {
        Position::new(
            self.row.saturating_add(delta_row),
            self.column.saturating_add(delta_column),
        )
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..64).map(Position::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Human-facing coordinate, like `e2`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    file: File,
    rank: Rank,
}

impl Coordinate {
    /// Creates a coordinate from file letter `file` (`'a'..='h'`) and rank number `rank` (`1..=8`)
    pub fn new(file: char, rank: u8) -> Result<Coordinate, CoordinateError> {
        Ok(Coordinate {
            file: File::from_char(file).ok_or(CoordinateError::InvalidFile(file))?,
            rank: Rank::from_number(rank).ok_or(CoordinateError::InvalidRank(rank))?,
        })
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coordinate {
        Coordinate { file, rank }
    }

    pub const fn file(&self) -> File {
        self.file
    }

    pub const fn rank(&self) -> Rank {
        self.rank
    }

    pub const fn to_position(&self) -> Position {
        Position::from_parts(self.file, self.rank)
    }

    pub fn from_position(pos: Position) -> Result<Coordinate, CoordinateError> {
        if !pos.is_valid() {
            return Err(CoordinateError::OffBoard(pos));
        }
        Ok(Coordinate {
            file: File::from_index(pos.column() as usize),
            rank: Rank::from_index(pos.row() as usize),
        })
    }
}

impl From<Coordinate> for Position {
    fn from(c: Coordinate) -> Position {
        c.to_position()
    }
}

impl TryFrom<Position> for Coordinate {
    type Error = CoordinateError;

    fn try_from(pos: Position) -> Result<Coordinate, CoordinateError> {
        Coordinate::from_position(pos)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file, self.rank)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file_ch), Some(rank_ch), None) => (file_ch, rank_ch),
            _ => return Err(CoordinateError::BadLength),
        };
        Ok(Coordinate {
            file: File::from_char(file_ch).ok_or(CoordinateError::InvalidFile(file_ch))?,
            rank: Rank::from_char(rank_ch).ok_or(CoordinateError::UnexpectedRankChar(rank_ch))?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::King,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ];

    /// Uppercase letter of the piece
    pub fn as_char(&self) -> char {
        b"PKNBRQ"[*self as usize] as char
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Target piece for promotion
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    #[default]
    Queen = 5,
}

impl PromotePiece {
    /// Converts a promotion letter into the piece
    ///
    /// Letters are case-insensitive. Anything other than `N`, `B` or `R` becomes a queen.
    pub fn from_char(c: char) -> PromotePiece {
        match c.to_ascii_uppercase() {
            'N' => PromotePiece::Knight,
            'B' => PromotePiece::Bishop,
            'R' => PromotePiece::Rook,
            _ => PromotePiece::Queen,
        }
    }

    /// Same as [`PromotePiece::from_char()`], but for a whole string
    ///
    /// Only one-letter strings can choose a piece other than a queen.
    pub fn from_letter(s: &str) -> PromotePiece {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PromotePiece::from_char(c),
            _ => PromotePiece::Queen,
        }
    }
}

impl From<char> for PromotePiece {
    fn from(c: char) -> PromotePiece {
        PromotePiece::from_char(c)
    }
}

impl From<&str> for PromotePiece {
    fn from(s: &str) -> PromotePiece {
        PromotePiece::from_letter(s)
    }
}

impl From<PromotePiece> for PieceKind {
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

/// Contents of one board square, packed into a byte
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const MAX_INDEX: usize = 13;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_parts(c: Color, p: PieceKind) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn kind(&self) -> Option<PieceKind> {
        match self.0 {
            0 => None,
            1 | 7 => Some(PieceKind::Pawn),
            2 | 8 => Some(PieceKind::King),
            3 | 9 => Some(PieceKind::Knight),
            4 | 10 => Some(PieceKind::Bishop),
            5 | 11 => Some(PieceKind::Rook),
            6 | 12 => Some(PieceKind::Queen),
            _ => unsafe { hint::unreachable_unchecked() },
        }
    }

    /// Returns the pair `(kind, color)`, or `None` for an empty cell
    pub const fn parts(&self) -> Option<(PieceKind, Color)> {
        match (self.kind(), self.color()) {
            (Some(kind), Some(color)) => Some((kind, color)),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        b".PKNBRQpknbrq"[self.0 as usize] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'k' => PieceKind::King,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            _ => return None,
        };
        Some(Cell::from_parts(color, kind))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if (self.0 as usize) < Self::MAX_INDEX {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

impl CastlingSide {
    /// Column step from the king toward the rook of this side
    pub const fn direction(&self) -> i8 {
        match *self {
            CastlingSide::Queen => -1,
            CastlingSide::King => 1,
        }
    }

    /// Distance in columns between the king and the rook of this side
    pub const fn rook_distance(&self) -> i8 {
        match *self {
            CastlingSide::Queen => 4,
            CastlingSide::King => 3,
        }
    }
}
