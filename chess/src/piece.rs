//! Legal targets of pieces
//!
//! Targets computed here are _raw_: they follow the movement rules of each piece, but don't
//! consider whether the king of the moving side remains under attack. Filtering such moves
//! out is the job of [`Match`](crate::game::Match).

use crate::bitboard::Bitboard;
use crate::board::{Board, PieceId};
use crate::geometry;
use crate::types::{CastlingSide, Color, PieceKind, Position};

const ROOK_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Match state needed by the pieces whose moves depend on more than the board
///
/// Pawns need to know which pawn may be captured enpassant, and kings cannot castle while in
/// check.
pub trait Rules {
    /// Pawn which has just made a double move
    fn enpassant_vulnerable(&self) -> Option<PieceId>;

    /// Whether the side to move is in check
    fn is_check(&self) -> bool;
}

/// Rules without enpassant and check
#[derive(Clone, Debug, Default)]
pub struct NilRules;

impl Rules for NilRules {
    #[inline]
    fn enpassant_vulnerable(&self) -> Option<PieceId> {
        None
    }

    #[inline]
    fn is_check(&self) -> bool {
        false
    }
}

/// Returns `true` if a piece of color `color` may land on `pos`, i.e. the square is on the
/// board and is either empty or holds an opponent's piece
#[inline]
pub fn can_occupy(board: &Board, pos: Position, color: Color) -> bool {
    match board.piece_at(pos) {
        Ok(Some(p)) => p.color() != color,
        Ok(None) => true,
        Err(_) => false,
    }
}

#[inline]
fn is_opponent(board: &Board, pos: Position, color: Color) -> bool {
    matches!(board.piece_at(pos), Ok(Some(p)) if p.color() != color)
}

#[inline]
fn is_free(board: &Board, pos: Position) -> bool {
    matches!(board.is_occupied(pos), Ok(false))
}

fn slide(board: &Board, src: Position, color: Color, dirs: &[(i8, i8)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(dr, dc) in dirs {
        let mut pos = src.shift(dr, dc);
        while is_free(board, pos) {
            res.set(pos);
            pos = pos.shift(dr, dc);
        }
        if is_opponent(board, pos, color) {
            res.set(pos);
        }
    }
    res
}

fn leap(board: &Board, src: Position, color: Color, deltas: &[(i8, i8)]) -> Bitboard {
    deltas
        .iter()
        .map(|&(dr, dc)| src.shift(dr, dc))
        .filter(|&pos| can_occupy(board, pos, color))
        .collect()
}

pub fn rook(board: &Board, src: Position, color: Color) -> Bitboard {
    slide(board, src, color, &ROOK_DIRS)
}

pub fn bishop(board: &Board, src: Position, color: Color) -> Bitboard {
    slide(board, src, color, &BISHOP_DIRS)
}

pub fn queen(board: &Board, src: Position, color: Color) -> Bitboard {
    rook(board, src, color) | bishop(board, src, color)
}

pub fn knight(board: &Board, src: Position, color: Color) -> Bitboard {
    leap(board, src, color, &KNIGHT_DELTAS)
}

fn is_castling_rook(board: &Board, pos: Position, color: Color) -> bool {
    matches!(
        board.piece_at(pos),
        Ok(Some(p)) if p.kind() == PieceKind::Rook && p.color() == color && p.move_count() == 0
    )
}

/// Returns the king's destination if castling to side `side` is allowed
///
/// Only the rook and the squares between are verified here. The caller must ensure that the
/// king itself has not moved and is not in check.
pub fn castling_target(
    board: &Board,
    src: Position,
    color: Color,
    side: CastlingSide,
) -> Option<Position> {
    let dir = side.direction();
    let dist = side.rook_distance();
    if !is_castling_rook(board, src.shift(0, dir * dist), color) {
        return None;
    }
    if !(1..dist).all(|step| is_free(board, src.shift(0, dir * step))) {
        return None;
    }
    Some(src.shift(0, 2 * dir))
}

pub fn king<R: Rules + ?Sized>(
    board: &Board,
    src: Position,
    color: Color,
    move_count: u32,
    rules: &R,
) -> Bitboard {
    let mut res = leap(board, src, color, &KING_DELTAS);
    if move_count == 0 && !rules.is_check() {
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if let Some(dst) = castling_target(board, src, color, side) {
                res.set(dst);
            }
        }
    }
    res
}

pub fn pawn<R: Rules + ?Sized>(
    board: &Board,
    src: Position,
    color: Color,
    move_count: u32,
    rules: &R,
) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    let fwd = geometry::pawn_forward_delta(color);

    let single = src.shift(fwd, 0);
    if is_free(board, single) {
        res.set(single);
        let double = src.shift(2 * fwd, 0);
        if move_count == 0 && is_free(board, double) {
            res.set(double);
        }
    }

    for dc in [-1, 1] {
        let dst = src.shift(fwd, dc);
        if is_opponent(board, dst, color) {
            res.set(dst);
        }
    }

    if src.row() == geometry::enpassant_src_rank(color).index() as i8 {
        if let Some(vulnerable) = rules.enpassant_vulnerable() {
            for dc in [-1, 1] {
                let beside = src.shift(0, dc);
                if matches!(board.get(beside), Ok(Some(id)) if id == vulnerable)
                    && is_opponent(board, beside, color)
                {
                    res.set(src.shift(fwd, dc));
                }
            }
        }
    }

    res
}

/// Returns raw legal targets of the piece `id`
///
/// Returns an empty set if the piece is not on the board.
pub fn legal_targets<R: Rules + ?Sized>(board: &Board, id: PieceId, rules: &R) -> Bitboard {
    let piece = board.piece(id);
    let src = match piece.position() {
        Some(src) => src,
        None => return Bitboard::EMPTY,
    };
    let color = piece.color();
    match piece.kind() {
        PieceKind::Rook => rook(board, src, color),
        PieceKind::Bishop => bishop(board, src, color),
        PieceKind::Queen => queen(board, src, color),
        PieceKind::Knight => knight(board, src, color),
        PieceKind::King => king(board, src, color, piece.move_count(), rules),
        PieceKind::Pawn => pawn(board, src, color, piece.move_count(), rules),
    }
}

/// Returns `true` if any piece of color `by` has `pos` among its raw legal targets
pub fn is_attacked<R: Rules + ?Sized>(board: &Board, pos: Position, by: Color, rules: &R) -> bool {
    board
        .pieces()
        .filter(|(_, p)| p.color() == by && p.position().is_some())
        .any(|(id, _)| legal_targets(board, id, rules).has(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;
    use std::str::FromStr;

    fn pos(s: &str) -> Position {
        Coordinate::from_str(s).unwrap().to_position()
    }

    fn set(items: &[&str]) -> Bitboard {
        items.iter().map(|s| pos(s)).collect()
    }

    fn add(board: &mut Board, kind: PieceKind, color: Color, at: &str) -> PieceId {
        let id = board.create(kind, color, 0);
        board.place(id, pos(at)).unwrap();
        id
    }

    struct EnpassantRules(PieceId);

    impl Rules for EnpassantRules {
        fn enpassant_vulnerable(&self) -> Option<PieceId> {
            Some(self.0)
        }

        fn is_check(&self) -> bool {
            false
        }
    }

    struct CheckRules;

    impl Rules for CheckRules {
        fn enpassant_vulnerable(&self) -> Option<PieceId> {
            None
        }

        fn is_check(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_rook_rays() {
        let mut b = Board::new();
        let rook = add(&mut b, PieceKind::Rook, Color::White, "d4");
        add(&mut b, PieceKind::Pawn, Color::White, "d6");
        add(&mut b, PieceKind::Pawn, Color::Black, "f4");
        let res = legal_targets(&b, rook, &NilRules);
        assert_eq!(
            res,
            set(&["d5", "d3", "d2", "d1", "c4", "b4", "a4", "e4", "f4"])
        );
    }

    #[test]
    fn test_bishop_rays() {
        let mut b = Board::new();
        let bishop = add(&mut b, PieceKind::Bishop, Color::Black, "c1");
        add(&mut b, PieceKind::Knight, Color::White, "e3");
        add(&mut b, PieceKind::Knight, Color::Black, "a3");
        let res = legal_targets(&b, bishop, &NilRules);
        assert_eq!(res, set(&["d2", "e3", "b2"]));
    }

    #[test]
    fn test_queen_corner() {
        let mut b = Board::new();
        let queen = add(&mut b, PieceKind::Queen, Color::White, "a1");
        let res = legal_targets(&b, queen, &NilRules);
        assert_eq!(res.len(), 21);
        assert!(res.has(pos("h8")));
        assert!(res.has(pos("a8")));
        assert!(res.has(pos("h1")));
    }

    #[test]
    fn test_sliding_stops_at_first_piece() {
        let mut b = Board::new();
        let queen = add(&mut b, PieceKind::Queen, Color::White, "a1");
        add(&mut b, PieceKind::Pawn, Color::Black, "a3");
        add(&mut b, PieceKind::Pawn, Color::Black, "a5");
        add(&mut b, PieceKind::Pawn, Color::White, "c1");
        let res = legal_targets(&b, queen, &NilRules);
        assert!(res.has(pos("a2")));
        assert!(res.has(pos("a3")));
        assert!(!res.has(pos("a4")));
        assert!(!res.has(pos("a5")));
        assert!(res.has(pos("b1")));
        assert!(!res.has(pos("c1")));
        assert!(!res.has(pos("d1")));
    }

    #[test]
    fn test_knight() {
        let mut b = Board::new();
        let knight = add(&mut b, PieceKind::Knight, Color::White, "b1");
        add(&mut b, PieceKind::Pawn, Color::White, "d2");
        add(&mut b, PieceKind::Pawn, Color::Black, "c3");
        let res = legal_targets(&b, knight, &NilRules);
        assert_eq!(res, set(&["a3", "c3"]));
    }

    #[test]
    fn test_king_steps() {
        let mut b = Board::new();
        let king = add(&mut b, PieceKind::King, Color::White, "h1");
        add(&mut b, PieceKind::Pawn, Color::White, "h2");
        add(&mut b, PieceKind::Pawn, Color::Black, "g2");
        let res = legal_targets(&b, king, &NilRules);
        assert_eq!(res, set(&["g1", "g2"]));
    }

    #[test]
    fn test_castling() {
        let mut b = Board::new();
        let king = add(&mut b, PieceKind::King, Color::White, "e1");
        add(&mut b, PieceKind::Rook, Color::White, "a1");
        add(&mut b, PieceKind::Rook, Color::White, "h1");
        let res = legal_targets(&b, king, &NilRules);
        assert!(res.has(pos("g1")));
        assert!(res.has(pos("c1")));

        // No castling while in check
        let res = legal_targets(&b, king, &CheckRules);
        assert!(!res.has(pos("g1")));
        assert!(!res.has(pos("c1")));

        // Blocked on the queenside
        add(&mut b, PieceKind::Knight, Color::White, "b1");
        let res = legal_targets(&b, king, &NilRules);
        assert!(res.has(pos("g1")));
        assert!(!res.has(pos("c1")));
    }

    #[test]
    fn test_castling_needs_unmoved_pieces() {
        let mut b = Board::new();
        let king = b.create(PieceKind::King, Color::Black, 0);
        b.place(king, pos("e8")).unwrap();
        let rook = b.create(PieceKind::Rook, Color::Black, 1);
        b.place(rook, pos("h8")).unwrap();
        add(&mut b, PieceKind::Rook, Color::White, "a8");
        let res = legal_targets(&b, king, &NilRules);
        assert!(!res.has(pos("g8")));
        assert!(!res.has(pos("c8")));

        let mut b = Board::new();
        let king = b.create(PieceKind::King, Color::Black, 1);
        b.place(king, pos("e8")).unwrap();
        add(&mut b, PieceKind::Rook, Color::Black, "h8");
        let res = legal_targets(&b, king, &NilRules);
        assert!(!res.has(pos("g8")));
    }

    #[test]
    fn test_pawn_double() {
        let mut b = Board::new();
        let pawn = add(&mut b, PieceKind::Pawn, Color::White, "e2");
        assert_eq!(legal_targets(&b, pawn, &NilRules), set(&["e3", "e4"]));

        let blocker = add(&mut b, PieceKind::Knight, Color::Black, "e4");
        assert_eq!(legal_targets(&b, pawn, &NilRules), set(&["e3"]));
        b.remove(pos("e4")).unwrap();

        b.place(blocker, pos("e3")).unwrap();
        assert_eq!(legal_targets(&b, pawn, &NilRules), Bitboard::EMPTY);
        b.remove(pos("e3")).unwrap();

        b.add_move(pawn);
        assert_eq!(legal_targets(&b, pawn, &NilRules), set(&["e3"]));
    }

    #[test]
    fn test_pawn_captures() {
        let mut b = Board::new();
        let pawn = add(&mut b, PieceKind::Pawn, Color::Black, "d7");
        add(&mut b, PieceKind::Knight, Color::White, "c6");
        add(&mut b, PieceKind::Knight, Color::Black, "e6");
        add(&mut b, PieceKind::Knight, Color::White, "d6");
        assert_eq!(legal_targets(&b, pawn, &NilRules), set(&["c6"]));
    }

    #[test]
    fn test_enpassant() {
        let mut b = Board::new();
        let pawn = add(&mut b, PieceKind::Pawn, Color::White, "e5");
        b.add_move(pawn);
        let victim = add(&mut b, PieceKind::Pawn, Color::Black, "d5");
        let other = add(&mut b, PieceKind::Pawn, Color::Black, "f5");
        assert_eq!(legal_targets(&b, pawn, &NilRules), set(&["e6"]));
        assert_eq!(
            legal_targets(&b, pawn, &EnpassantRules(victim)),
            set(&["e6", "d6"])
        );
        assert_eq!(
            legal_targets(&b, pawn, &EnpassantRules(other)),
            set(&["e6", "f6"])
        );
    }

    #[test]
    fn test_enpassant_wrong_rank() {
        let mut b = Board::new();
        let pawn = add(&mut b, PieceKind::Pawn, Color::Black, "e5");
        b.add_move(pawn);
        let victim = add(&mut b, PieceKind::Pawn, Color::White, "d5");
        assert_eq!(
            legal_targets(&b, pawn, &EnpassantRules(victim)),
            set(&["e4"])
        );
    }

    #[test]
    fn test_is_attacked() {
        let mut b = Board::new();
        add(&mut b, PieceKind::King, Color::White, "e1");
        add(&mut b, PieceKind::Rook, Color::Black, "e8");
        assert!(is_attacked(&b, pos("e1"), Color::Black, &NilRules));
        assert!(!is_attacked(&b, pos("d1"), Color::Black, &NilRules));
        add(&mut b, PieceKind::Bishop, Color::White, "e4");
        assert!(!is_attacked(&b, pos("e1"), Color::Black, &NilRules));
    }

    #[test]
    fn test_can_occupy() {
        let mut b = Board::new();
        add(&mut b, PieceKind::Pawn, Color::White, "a2");
        add(&mut b, PieceKind::Pawn, Color::Black, "a7");
        assert!(can_occupy(&b, pos("a3"), Color::White));
        assert!(!can_occupy(&b, pos("a2"), Color::White));
        assert!(can_occupy(&b, pos("a7"), Color::White));
        assert!(!can_occupy(&b, Position::new(-1, 0), Color::White));
    }
}
