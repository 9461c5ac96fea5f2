//! Moves and their reversible application to the board

use crate::board::{Board, BoardError, PieceId};
use crate::geometry;
use crate::types::{CastlingSide, Color, PieceKind, Position};

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple = 1,
    /// Kingside castling
    CastlingKingside = 2,
    /// Queenside castling
    CastlingQueenside = 3,
    /// Single pawn move (either non-capture or capture)
    PawnSimple = 4,
    /// Double pawn move
    PawnDouble = 5,
    /// Enpassant
    Enpassant = 6,
}

impl TryFrom<MoveKind> for CastlingSide {
    type Error = ();

    #[inline]
    fn try_from(kind: MoveKind) -> Result<Self, Self::Error> {
        match kind {
            MoveKind::CastlingKingside => Ok(Self::King),
            MoveKind::CastlingQueenside => Ok(Self::Queen),
            _ => Err(()),
        }
    }
}

/// Move of a piece from one square to another
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    piece: PieceId,
    src: Position,
    dst: Position,
    side: Color,
}

impl Move {
    /// Creates a move of the piece on `src` to `dst`, deducing its kind
    ///
    /// Returns `Ok(None)` if `src` is empty. The move is not validated against the legal targets
    /// of the piece.
    pub fn new(board: &Board, src: Position, dst: Position) -> Result<Option<Move>, BoardError> {
        let id = match board.get(src)? {
            Some(id) => id,
            None => return Ok(None),
        };
        let dst_occupied = board.is_occupied(dst)?;
        let piece = board.piece(id);
        let d_row = dst.row() - src.row();
        let d_col = dst.column() - src.column();
        let kind = match piece.kind() {
            PieceKind::King if d_col == 2 => MoveKind::CastlingKingside,
            PieceKind::King if d_col == -2 => MoveKind::CastlingQueenside,
            PieceKind::Pawn if d_row.abs() == 2 => MoveKind::PawnDouble,
            PieceKind::Pawn if d_col != 0 && !dst_occupied => MoveKind::Enpassant,
            PieceKind::Pawn => MoveKind::PawnSimple,
            _ => MoveKind::Simple,
        };
        Ok(Some(Move {
            kind,
            piece: id,
            src,
            dst,
            side: piece.color(),
        }))
    }

    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Piece which makes the move
    #[inline]
    pub fn piece(&self) -> PieceId {
        self.piece
    }

    #[inline]
    pub fn src(&self) -> Position {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Position {
        self.dst
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Returns `true` if this is a pawn move to the last rank
    #[inline]
    pub fn is_promote(&self) -> bool {
        matches!(
            self.kind,
            MoveKind::PawnSimple | MoveKind::PawnDouble | MoveKind::Enpassant
        ) && self.dst.row() == geometry::promote_rank(self.side).index() as i8
    }

    /// Returns the square of the piece captured by this move, if it was not empty
    #[inline]
    pub fn capture_square(&self) -> Position {
        match self.kind {
            MoveKind::Enpassant => Position::new(self.src.row(), self.dst.column()),
            _ => self.dst,
        }
    }
}

/// Data required to unmake a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawUndo {
    mv: Move,
    captured: Option<PieceId>,
    rook: Option<(PieceId, Position, Position)>,
}

impl RawUndo {
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Piece captured by the move
    #[inline]
    pub fn captured(&self) -> Option<PieceId> {
        self.captured
    }
}

/// Makes the move `mv` on the board `b`
///
/// The move must be among the raw legal targets of its piece. To allow unmaking the move, a
/// `RawUndo` instance is returned.
pub(crate) fn make_move(b: &mut Board, mv: Move) -> RawUndo {
    let captured = b.take(mv.capture_square());
    b.take(mv.src);
    b.put(mv.piece, mv.dst);
    b.add_move(mv.piece);

    let rook = CastlingSide::try_from(mv.kind).ok().and_then(|side| {
        let dir = side.direction();
        let rook_src = mv.src.shift(0, dir * side.rook_distance());
        let rook_dst = mv.src.shift(0, dir);
        let rook = b.take(rook_src)?;
        b.put(rook, rook_dst);
        b.add_move(rook);
        Some((rook, rook_src, rook_dst))
    });

    RawUndo { mv, captured, rook }
}

/// Unmakes the move on the board `b`
///
/// This must be called only on the position occured right after the corresponding call to
/// [`make_move()`].
pub(crate) fn unmake_move(b: &mut Board, u: &RawUndo) {
    let mv = u.mv;
    if let Some((rook, rook_src, rook_dst)) = u.rook {
        b.take(rook_dst);
        b.put(rook, rook_src);
        b.sub_move(rook);
    }
    b.take(mv.dst);
    b.put(mv.piece, mv.src);
    b.sub_move(mv.piece);
    if let Some(captured) = u.captured {
        b.put(captured, mv.capture_square());
    }
}
