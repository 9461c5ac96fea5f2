//! Chess match
//!
//! [`Match`] is the only way to change the position: it validates moves, executes them
//! (including castling, enpassant and promotion), rejects moves that leave the own king
//! under attack, and detects check and checkmate.

use crate::bitboard::Bitboard;
use crate::board::{Board, BoardError, Piece, PieceId};
use crate::moves::{self, Move, MoveKind, RawUndo};
use crate::piece::{self, Rules};
use crate::setup::{Setup, ValidateError};
use crate::snapshot::Snapshot;
use crate::types::{Color, Coordinate, CoordinateError, PieceKind, Position, PromotePiece};

use arrayvec::ArrayVec;
use log::{debug, trace};
use thiserror::Error;

/// Error making a move or resolving a promotion
///
/// If any of these errors is returned, the match is left unchanged.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// Coordinate is invalid
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    /// Position is outside the board
    #[error("bad position: {0}")]
    Board(#[from] BoardError),
    /// There is no piece on the source square
    #[error("no piece on {0}")]
    EmptySource(Coordinate),
    /// Piece on the source square belongs to the side which is not to move
    #[error("piece on {0} is not owned by {1}")]
    WrongTurnOwner(Coordinate, Color),
    /// Piece on the source square cannot move anywhere
    #[error("piece on {0} has no legal moves")]
    NoLegalMoves(Coordinate),
    /// Piece cannot move to the target square
    #[error("piece cannot move to {0}")]
    IllegalTarget(Coordinate),
    /// Move would leave the own king under attack
    #[error("move would leave the king in check")]
    SelfCheck,
    /// Promotion is resolved while no pawn awaits it
    #[error("no promotion is pending")]
    PromotionNotPending,
    /// Move is requested before the pending promotion is resolved
    #[error("promotion must be resolved first")]
    PromotionPending,
    /// Move is requested after checkmate
    #[error("match is finished")]
    Finished,
    /// Undo is requested, but no moves were made
    #[error("no moves to undo")]
    NothingToUndo,
}

/// State of the match controller
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    /// Match waits for a move
    Idle,
    /// Pawn has reached the last rank and waits for [`Match::resolve_promotion()`]
    AwaitingPromotion,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct Status {
    turn: u32,
    side: Color,
    check: bool,
    mated: Option<Color>,
    enpassant: Option<PieceId>,
    promotion: Option<PieceId>,
}

#[derive(Debug, Clone)]
struct Record {
    undo: RawUndo,
    status: Status,
    promoted: Option<PieceId>,
}

/// Chess match between two players
///
/// # Example
///
/// ```
/// # use rookery::{Match, Color, Coordinate};
/// #
/// let mut game = Match::new();
/// let e2: Coordinate = "e2".parse().unwrap();
/// let e4: Coordinate = "e4".parse().unwrap();
///
/// assert!(game.legal_targets(e2).unwrap().has(e4.to_position()));
/// assert_eq!(game.execute_move(e2, e4), Ok(None));
/// assert_eq!(game.side(), Color::Black);
/// assert_eq!(game.turn(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    status: Status,
    on_board: ArrayVec<PieceId, 32>,
    captured: Vec<PieceId>,
    history: Vec<Record>,
}

impl Rules for Match {
    #[inline]
    fn enpassant_vulnerable(&self) -> Option<PieceId> {
        self.status.enpassant
    }

    #[inline]
    fn is_check(&self) -> bool {
        self.status.check
    }
}

fn coordinate(pos: Position) -> Result<Coordinate, MoveError> {
    Coordinate::from_position(pos).map_err(|_| BoardError::OutOfBounds(pos).into())
}

impl Match {
    /// Starts a match from the initial position
    pub fn new() -> Match {
        let mut res = Match::build(&Setup::initial());
        res.refresh_check();
        res
    }

    /// Starts a match from a custom position
    pub fn from_setup(setup: &Setup) -> Result<Match, ValidateError> {
        setup.validate_static()?;
        let mut res = Match::build(setup);
        if res.in_check(setup.side.inv()) {
            return Err(ValidateError::OpponentKingAttacked);
        }
        res.refresh_check();
        Ok(res)
    }

    fn build(setup: &Setup) -> Match {
        let mut board = Board::new();
        let mut on_board = ArrayVec::new();
        for (pos, cell) in setup.occupied() {
            if let Some((kind, color)) = cell.parts() {
                let id = board.create(kind, color, u32::from(setup.moved.has(pos)));
                board.put(id, pos);
                on_board.push(id);
            }
        }
        Match {
            board,
            status: Status {
                turn: setup.turn,
                side: setup.side,
                check: false,
                mated: None,
                enpassant: None,
                promotion: None,
            },
            on_board,
            captured: Vec::new(),
            history: Vec::new(),
        }
    }

    fn refresh_check(&mut self) {
        let side = self.status.side;
        self.status.check = self.in_check(side);
        if self.status.check && self.in_checkmate(side) {
            self.status.mated = Some(side);
        }
    }

    /// Turn number, starting from 1 and incremented after every move
    #[inline]
    pub fn turn(&self) -> u32 {
        self.status.turn
    }

    /// Side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.status.side
    }

    /// Returns `true` if the side to move is in check
    ///
    /// After checkmate, tells whether the checkmated side is in check, which is always `true`.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.status.check
    }

    /// Returns `true` if the match is finished by checkmate
    ///
    /// No moves are accepted after checkmate. Use [`Match::mated_side()`] to find out who lost.
    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.status.mated.is_some()
    }

    /// Checkmated side, if any
    ///
    /// When checkmate is delivered by a move, [`Match::side()`] stays on the side which made it.
    /// When the match starts from a checkmated position, [`Match::side()`] is the checkmated
    /// side. This method gives the same answer in both cases.
    #[inline]
    pub fn mated_side(&self) -> Option<Color> {
        self.status.mated
    }

    /// Side which delivered checkmate, if any
    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.status.mated.map(|c| c.inv())
    }

    #[inline]
    pub fn state(&self) -> State {
        match self.status.promotion {
            Some(_) => State::AwaitingPromotion,
            None => State::Idle,
        }
    }

    /// Pawn waiting for promotion
    #[inline]
    pub fn pending_promotion(&self) -> Option<&Piece> {
        self.status.promotion.map(|id| self.board.piece(id))
    }

    /// Pawn which can be captured enpassant on this move
    #[inline]
    pub fn enpassant_pawn(&self) -> Option<&Piece> {
        self.status.enpassant.map(|id| self.board.piece(id))
    }

    /// Captured pieces, in the order of capture
    pub fn captured(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.captured.iter().map(|&id| self.board.piece(id))
    }

    /// Pieces on the board
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.on_board.iter().map(|&id| self.board.piece(id))
    }

    /// Returns the piece on the square `c`
    #[inline]
    pub fn piece_at(&self, c: Coordinate) -> Option<&Piece> {
        self.board.piece_at(c.to_position()).ok().flatten()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.board)
    }

    /// Number of moves which can be undone
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn ensure_idle(&self) -> Result<(), MoveError> {
        if self.status.mated.is_some() {
            return Err(MoveError::Finished);
        }
        if self.status.promotion.is_some() {
            return Err(MoveError::PromotionPending);
        }
        Ok(())
    }

    fn source_targets(&self, src: Position) -> Result<(PieceId, Bitboard), MoveError> {
        let id = self.board.get(src)?;
        let source = coordinate(src)?;
        let id = id.ok_or(MoveError::EmptySource(source))?;
        if self.board.piece(id).color() != self.status.side {
            return Err(MoveError::WrongTurnOwner(source, self.status.side));
        }
        let targets = piece::legal_targets(&self.board, id, self);
        if targets.is_empty() {
            return Err(MoveError::NoLegalMoves(source));
        }
        Ok((id, targets))
    }

    /// Returns the raw legal targets of the piece on `source`
    ///
    /// The targets are not filtered by self-check: some of them may still be rejected by
    /// [`Match::execute_move()`] with [`MoveError::SelfCheck`].
    #[inline]
    pub fn legal_targets(&self, source: Coordinate) -> Result<Bitboard, MoveError> {
        self.legal_targets_at(source.to_position())
    }

    /// Same as [`Match::legal_targets()`], but addressed by grid position
    pub fn legal_targets_at(&self, src: Position) -> Result<Bitboard, MoveError> {
        self.ensure_idle()?;
        Ok(self.source_targets(src)?.1)
    }

    /// Moves the piece from `source` to `target`
    ///
    /// Returns the piece captured by the move, if any. If the move is a pawn move to the last
    /// rank, the match awaits [`Match::resolve_promotion()`] before passing the turn.
    #[inline]
    pub fn execute_move(
        &mut self,
        source: Coordinate,
        target: Coordinate,
    ) -> Result<Option<Piece>, MoveError> {
        self.execute_move_at(source.to_position(), target.to_position())
    }

    /// Same as [`Match::execute_move()`], but addressed by grid positions
    pub fn execute_move_at(
        &mut self,
        src: Position,
        dst: Position,
    ) -> Result<Option<Piece>, MoveError> {
        self.ensure_idle()?;
        let (_, targets) = self.source_targets(src)?;
        let source = coordinate(src)?;
        let target = coordinate(dst)?;
        if !targets.has(dst) {
            return Err(MoveError::IllegalTarget(target));
        }
        let mv = Move::new(&self.board, src, dst)?.ok_or(MoveError::EmptySource(source))?;
        let side = mv.side();

        let before = self.status;
        self.status.enpassant = None;
        let undo = self.make_raw(mv);
        if self.in_check(side) {
            self.unmake_raw(&undo);
            self.status = before;
            trace!("{} {} -> {} rejected: king is left in check", side, source, target);
            return Err(MoveError::SelfCheck);
        }
        if mv.kind() == MoveKind::PawnDouble {
            self.status.enpassant = Some(mv.piece());
        }
        let captured = undo.captured().map(|id| *self.board.piece(id));
        self.history.push(Record {
            undo,
            status: before,
            promoted: None,
        });
        debug!("turn {}: {} {} -> {}", before.turn, side, source, target);

        if mv.is_promote() {
            self.status.promotion = Some(mv.piece());
            debug!("promotion pending on {}", target);
        } else {
            self.finish_turn();
        }

        #[cfg(feature = "selftest")]
        self.audit();

        Ok(captured)
    }

    /// Replaces the pawn awaiting promotion with a piece of kind `kind`, then passes the turn
    ///
    /// Anything that doesn't denote a knight, a bishop or a rook chooses a queen. Returns the
    /// new piece.
    pub fn resolve_promotion(&mut self, kind: impl Into<PromotePiece>) -> Result<Piece, MoveError> {
        let pawn = self.status.promotion.ok_or(MoveError::PromotionNotPending)?;
        let kind = PieceKind::from(kind.into());
        let color = self.board.piece(pawn).color();
        let pos = match self.board.piece(pawn).position() {
            Some(pos) => pos,
            None => panic!("pawn awaiting promotion is not on the board"),
        };

        self.board.take(pos);
        self.remove_on_board(pawn);
        let promoted = self.board.create(kind, color, 0);
        self.board.put(promoted, pos);
        self.insert_on_board(promoted);
        if let Some(record) = self.history.last_mut() {
            record.promoted = Some(promoted);
        }
        self.status.promotion = None;
        debug!("{} pawn promoted to {}", color, kind);

        self.finish_turn();

        #[cfg(feature = "selftest")]
        self.audit();

        Ok(*self.board.piece(promoted))
    }

    /// Takes back the last move
    ///
    /// Captured pieces return to the board, and the turn, the side to move and all the flags
    /// are restored. If the move was a promotion, the promoted piece turns back into the pawn.
    pub fn undo(&mut self) -> Result<(), MoveError> {
        let record = self.history.pop().ok_or(MoveError::NothingToUndo)?;
        let mv = record.undo.mv();
        if let Some(promoted) = record.promoted {
            self.board.take(mv.dst());
            self.remove_on_board(promoted);
            self.board.discard(promoted);
            self.board.put(mv.piece(), mv.dst());
            self.insert_on_board(mv.piece());
        }
        self.unmake_raw(&record.undo);
        self.status = record.status;
        debug!("turn {}: {} move taken back", self.status.turn, self.status.side);

        #[cfg(feature = "selftest")]
        self.audit();

        Ok(())
    }

    fn finish_turn(&mut self) {
        let opponent = self.status.side.inv();
        self.status.check = self.in_check(opponent);
        if self.status.check && self.in_checkmate(opponent) {
            self.status.mated = Some(opponent);
            debug!("checkmate, {} wins", self.status.side);
            return;
        }
        self.status.turn += 1;
        self.status.side = opponent;
    }

    fn remove_on_board(&mut self, id: PieceId) {
        if let Ok(idx) = self.on_board.binary_search(&id) {
            self.on_board.remove(idx);
        }
    }

    fn insert_on_board(&mut self, id: PieceId) {
        if let Err(idx) = self.on_board.binary_search(&id) {
            self.on_board.insert(idx, id);
        }
    }

    fn make_raw(&mut self, mv: Move) -> RawUndo {
        let undo = moves::make_move(&mut self.board, mv);
        if let Some(victim) = undo.captured() {
            self.remove_on_board(victim);
            self.captured.push(victim);
        }
        undo
    }

    fn unmake_raw(&mut self, undo: &RawUndo) {
        moves::unmake_move(&mut self.board, undo);
        if let Some(victim) = undo.captured() {
            let last = self.captured.pop();
            debug_assert_eq!(last, Some(victim));
            self.insert_on_board(victim);
        }
    }

    fn king_position(&self, color: Color) -> Position {
        self.pieces()
            .find(|p| p.kind() == PieceKind::King && p.color() == color)
            .and_then(Piece::position)
            .unwrap_or_else(|| panic!("no {} king on the board", color))
    }

    /// Returns `true` if the king of color `color` is attacked
    ///
    /// # Panics
    ///
    /// Panics if there is no such king on the board.
    pub fn in_check(&self, color: Color) -> bool {
        let king = self.king_position(color);
        piece::is_attacked(&self.board, king, color.inv(), self)
    }

    /// Returns `true` if the king of color `color` is attacked and no move of its side removes
    /// the attack
    ///
    /// Every candidate move is made and taken back, so the match remains unchanged.
    ///
    /// # Panics
    ///
    /// Panics if there is no such king on the board.
    pub fn in_checkmate(&mut self, color: Color) -> bool {
        if !self.in_check(color) {
            return false;
        }

        let this: &Match = self;
        let candidates: ArrayVec<(Position, Bitboard), 32> = this
            .on_board
            .iter()
            .copied()
            .map(|id| this.board.piece(id))
            .filter(|p| p.color() == color)
            .filter_map(|p| p.position())
            .filter_map(|src| {
                let id = this.board.get(src).ok().flatten()?;
                Some((src, piece::legal_targets(&this.board, id, this)))
            })
            .collect();

        for (src, targets) in candidates {
            for dst in targets {
                let mv = match Move::new(&self.board, src, dst) {
                    Ok(Some(mv)) => mv,
                    _ => continue,
                };
                let undo = self.make_raw(mv);
                let escaped = !self.in_check(color);
                self.unmake_raw(&undo);
                if escaped {
                    trace!("{} escapes check by {:?}", color, mv);
                    return false;
                }
            }
        }
        true
    }

    /// Verifies that the board, the set of pieces on it and the captured pieces agree
    #[cfg(any(test, feature = "selftest"))]
    fn audit(&self) {
        self.board.audit();
        let placed: Vec<PieceId> = self
            .board
            .pieces()
            .filter(|(_, p)| p.position().is_some())
            .map(|(id, _)| id)
            .collect();
        assert_eq!(placed.as_slice(), self.on_board.as_slice());
        for &id in &self.captured {
            assert_eq!(self.board.piece(id).position(), None);
        }
    }
}

impl Default for Match {
    #[inline]
    fn default() -> Match {
        Match::new()
    }
}

impl TryFrom<&Setup> for Match {
    type Error = ValidateError;

    #[inline]
    fn try_from(setup: &Setup) -> Result<Match, ValidateError> {
        Match::from_setup(setup)
    }
}
