//! Mutable game position with make/unmake over the rules engine.

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::error::PositionError;
use crate::fen::STARTING_FEN;
use crate::outcome::Outcome;

/// Halfmove clock value at which the fifty-move rule applies.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// State saved by [`Position::make_move`] and restored by [`Position::unmake_move`].
#[derive(Debug, Clone, Copy)]
struct Undo {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A chess position with move counters and an undo stack.
///
/// The rules engine supplies legality, check detection and hashing; this
/// type adds the halfmove clock, the fullmove number and strict
/// make/unmake pairing. Every [`make_move`](Self::make_move) or successful
/// [`make_null_move`](Self::make_null_move) must be matched by exactly one
/// unmake before the caller returns.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    undo: Vec<Undo>,
}

impl Position {
    pub(crate) fn from_parts(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        Self {
            board,
            halfmove_clock,
            fullmove_number,
            undo: Vec::with_capacity(64),
        }
    }

    /// The standard starting position.
    pub fn starting_position() -> Self {
        Self::from_parts(Board::default(), 0, 1)
    }

    /// Parse a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        fen.parse()
    }

    /// The underlying rules-engine board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// 64-bit Zobrist key of the position.
    #[inline]
    pub fn key(&self) -> u64 {
        self.board.get_hash()
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Number of moves currently on the undo stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.undo.len()
    }

    /// All legal moves in generator order.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        MoveGen::new_legal(&self.board).len() > 0
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    /// The piece and its color on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece, color))
    }

    /// Count of all pieces on the board except the two kings.
    pub fn non_king_piece_count(&self) -> u32 {
        self.board.combined().popcnt() - self.board.pieces(Piece::King).popcnt()
    }

    /// Apply a legal move, pushing the previous state on the undo stack.
    pub fn make_move(&mut self, mv: ChessMove) {
        let resets_clock = self.is_capture(mv) || self.moving_piece(mv) == Some(Piece::Pawn);
        let mover = self.side_to_move();

        self.undo.push(Undo {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });

        self.board = self.board.make_move_new(mv);
        self.halfmove_clock = if resets_clock {
            0
        } else {
            self.halfmove_clock + 1
        };
        if mover == Color::Black {
            self.fullmove_number += 1;
        }
    }

    /// Restore the state saved by the most recent make.
    ///
    /// Calling this with an empty undo stack leaves the position unchanged.
    pub fn unmake_move(&mut self) {
        debug_assert!(!self.undo.is_empty(), "unmake_move without a matching make");
        if let Some(undo) = self.undo.pop() {
            self.board = undo.board;
            self.halfmove_clock = undo.halfmove_clock;
            self.fullmove_number = undo.fullmove_number;
        }
    }

    /// Pass the turn without moving.
    ///
    /// Returns `false` and leaves the position untouched when the side to
    /// move is in check, since passing would be illegal.
    pub fn make_null_move(&mut self) -> bool {
        let Some(next) = self.board.null_move() else {
            return false;
        };
        self.undo.push(Undo {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        self.board = next;
        true
    }

    /// Undo a successful [`make_null_move`](Self::make_null_move).
    pub fn unmake_null_move(&mut self) {
        self.unmake_move();
    }

    /// Outcome forced by the fifty-move rule, if it applies.
    ///
    /// A checkmate delivered on the hundredth halfmove still counts as a
    /// loss; every other position at or past the limit is a draw.
    pub fn halfmove_outcome(&self) -> Option<Outcome> {
        if self.halfmove_clock < FIFTY_MOVE_PLIES {
            return None;
        }
        match self.board.status() {
            BoardStatus::Checkmate => Some(Outcome::Loss),
            _ => Some(Outcome::Draw),
        }
    }

    /// Outcome when the side to move has no legal moves.
    pub fn game_over(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Ongoing => None,
            BoardStatus::Checkmate => Some(Outcome::Loss),
            BoardStatus::Stalemate => Some(Outcome::Draw),
        }
    }

    /// Parse a move in coordinate notation (`e2e4`, `e7e8q`) against the legal moves.
    pub fn parse_uci_move(&self, text: &str) -> Result<ChessMove, PositionError> {
        let wanted = text.trim().to_ascii_lowercase();
        MoveGen::new_legal(&self.board)
            .find(|mv| mv.to_string() == wanted)
            .ok_or_else(|| PositionError::IllegalMove {
                uci_move: text.to_string(),
            })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl PartialEq for Position {
    /// Positions compare by board and counters; the undo history is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Position {}

#[cfg(test)]
mod tests {
    use chess::{File, Rank};

    use super::*;

    fn sq(file: usize, rank: usize) -> Square {
        Square::make_square(Rank::from_index(rank), File::from_index(file))
    }

    #[test]
    fn starting_position_matches_fen() {
        let from_fen: Position = STARTING_FEN.parse().unwrap();
        assert_eq!(Position::starting_position(), from_fen);
        assert_eq!(Position::starting_position().key(), from_fen.key());
    }

    #[test]
    fn make_unmake_restores_everything() {
        let mut position = Position::starting_position();
        let before = position.clone();
        let mv = position.parse_uci_move("g1f3").unwrap();

        position.make_move(mv);
        assert_ne!(position.key(), before.key());
        assert_eq!(position.halfmove_clock(), 1);

        position.unmake_move();
        assert_eq!(position, before);
        assert_eq!(position.key(), before.key());
        assert_eq!(position.depth(), 0);
    }

    #[test]
    fn pawn_move_resets_halfmove_clock() {
        let mut position: Position = "4k3/8/8/8/8/8/4P3/4K3 w - - 12 30".parse().unwrap();
        let mv = position.parse_uci_move("e2e4").unwrap();
        position.make_move(mv);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 30);
    }

    #[test]
    fn black_move_advances_fullmove_number() {
        let mut position: Position = "4k3/8/8/8/8/8/8/4K3 b - - 3 9".parse().unwrap();
        let mv = position.parse_uci_move("e8d8").unwrap();
        position.make_move(mv);
        assert_eq!(position.fullmove_number(), 10);
        assert_eq!(position.halfmove_clock(), 4);
    }

    #[test]
    fn null_move_flips_side_and_restores() {
        let mut position = Position::starting_position();
        let key = position.key();
        assert!(position.make_null_move());
        assert_eq!(position.side_to_move(), Color::Black);
        assert_ne!(position.key(), key);
        position.unmake_null_move();
        assert_eq!(position.key(), key);
        assert_eq!(position.side_to_move(), Color::White);
    }

    #[test]
    fn null_move_refused_in_check() {
        let mut position: Position = "4k3/8/8/8/8/8/4q3/4K3 w - - 0 1".parse().unwrap();
        assert!(position.in_check());
        assert!(!position.make_null_move());
        assert_eq!(position.depth(), 0);
    }

    #[test]
    fn checkmate_is_loss() {
        let position: Position = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(position.game_over(), Some(Outcome::Loss));
        assert!(!position.has_legal_moves());
    }

    #[test]
    fn stalemate_is_draw() {
        let position: Position = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(position.game_over(), Some(Outcome::Draw));
    }

    #[test]
    fn fifty_move_rule() {
        let position: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 100 80".parse().unwrap();
        assert_eq!(position.halfmove_outcome(), Some(Outcome::Draw));

        let fresh: Position = "4k3/8/8/8/8/8/8/R3K3 w - - 99 80".parse().unwrap();
        assert_eq!(fresh.halfmove_outcome(), None);
    }

    #[test]
    fn fifty_move_rule_checkmate_still_loses() {
        let position: Position = "7k/6Q1/5K2/8/8/8/8/8 b - - 100 90".parse().unwrap();
        assert_eq!(position.halfmove_outcome(), Some(Outcome::Loss));
    }

    #[test]
    fn piece_at_reports_color() {
        let position = Position::starting_position();
        assert_eq!(position.piece_at(sq(4, 0)), Some((Piece::King, Color::White)));
        assert_eq!(position.piece_at(sq(3, 7)), Some((Piece::Queen, Color::Black)));
        assert_eq!(position.piece_at(sq(4, 4)), None);
    }

    #[test]
    fn non_king_piece_count() {
        assert_eq!(Position::starting_position().non_king_piece_count(), 30);
        let bare: Position = "8/8/4k3/8/8/4K3/8/8 w - - 0 1".parse().unwrap();
        assert_eq!(bare.non_king_piece_count(), 0);
    }

    #[test]
    fn illegal_move_rejected() {
        let position = Position::starting_position();
        assert!(matches!(
            position.parse_uci_move("e2e5"),
            Err(PositionError::IllegalMove { .. })
        ));
    }
}
