use crate::types::{Color, Rank};

/// Rank on which the king and rooks of color `c` start
pub const fn home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank on which the pawns of color `c` start
pub const fn pawn_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Rank a pawn of color `c` must stand on to capture enpassant
pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

/// Rank on which a pawn of color `c` gets promoted
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// Row step of a pawn of color `c` moving forward
pub const fn pawn_forward_delta(c: Color) -> i8 {
    match c {
        Color::White => -1,
        Color::Black => 1,
    }
}
