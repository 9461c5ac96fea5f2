//! # Rookery
//!
//! Rule engine for a two-player chess match: piece movement, castling, enpassant, promotion,
//! check and checkmate detection, plus undo of the moves made.
//!
//! The entry point is [`Match`]. It owns the [`Board`] and is the only way to change it. Use
//! [`Match::legal_targets()`] to query where a piece may go, [`Match::execute_move()`] to move
//! it, and [`Match::snapshot()`] to get a read-only copy of the board for rendering.
//!
//! # Example
//!
//! ```
//! use rookery::{Color, Coordinate, Match, MoveError, PieceKind, State};
//!
//! let mut game = Match::new();
//! let c = |s: &str| s.parse::<Coordinate>().unwrap();
//!
//! // Black cannot move first
//! assert_eq!(
//!     game.execute_move(c("e7"), c("e5")),
//!     Err(MoveError::WrongTurnOwner(c("e7"), Color::White)),
//! );
//!
//! for (src, dst) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
//!     game.execute_move(c(src), c(dst)).unwrap();
//! }
//! assert!(game.is_checkmate());
//! assert_eq!(game.state(), State::Idle);
//! assert_eq!(
//!     game.snapshot().get(c("h4")),
//!     Some((PieceKind::Queen, Color::Black)),
//! );
//! ```

pub mod board;
pub mod game;
pub mod moves;
pub mod piece;
pub mod setup;
pub mod snapshot;

pub use rookery_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, BoardError, Piece, PieceId};
pub use game::{Match, MoveError, State};
pub use moves::{Move, MoveKind};
pub use piece::{NilRules, Rules};
pub use setup::{Setup, ValidateError};
pub use snapshot::Snapshot;
pub use types::{
    CastlingSide, Cell, Color, Coordinate, CoordinateError, File, PieceKind, Position,
    PromotePiece, Rank,
};
