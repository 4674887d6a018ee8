//! Move predicates evaluated against the position a move is played from.

use chess::{ChessMove, File, Piece, Square};

use crate::position::Position;

impl Position {
    /// The kind of piece standing on the move's source square.
    #[inline]
    pub fn moving_piece(&self, mv: ChessMove) -> Option<Piece> {
        self.board().piece_on(mv.get_source())
    }

    /// Whether `mv` is an en passant capture.
    pub fn is_en_passant(&self, mv: ChessMove) -> bool {
        self.moving_piece(mv) == Some(Piece::Pawn)
            && mv.get_source().get_file() != mv.get_dest().get_file()
            && self.board().piece_on(mv.get_dest()).is_none()
    }

    /// Whether `mv` is a castling move (king travels two files).
    pub fn is_castling(&self, mv: ChessMove) -> bool {
        self.moving_piece(mv) == Some(Piece::King)
            && mv
                .get_source()
                .get_file()
                .to_index()
                .abs_diff(mv.get_dest().get_file().to_index())
                == 2
    }

    /// Whether `mv` removes an enemy piece. Castling never counts.
    pub fn is_capture(&self, mv: ChessMove) -> bool {
        self.captured_piece(mv).is_some()
    }

    /// The kind of piece `mv` captures, if any.
    pub fn captured_piece(&self, mv: ChessMove) -> Option<Piece> {
        if self.is_en_passant(mv) {
            return Some(Piece::Pawn);
        }
        let dest = mv.get_dest();
        match self.board().color_on(dest) {
            Some(color) if color != self.side_to_move() => self.board().piece_on(dest),
            _ => None,
        }
    }

    /// Square of the pawn removed by an en passant capture.
    pub fn en_passant_victim(&self, mv: ChessMove) -> Square {
        Square::make_square(mv.get_source().get_rank(), mv.get_dest().get_file())
    }

    /// Source and destination of the rook moved by a castling move.
    pub fn castling_rook(&self, mv: ChessMove) -> Option<(Square, Square)> {
        if !self.is_castling(mv) {
            return None;
        }
        let rank = mv.get_source().get_rank();
        let kingside = mv.get_dest().get_file().to_index() > mv.get_source().get_file().to_index();
        let (from, to) = if kingside {
            (File::H, File::F)
        } else {
            (File::A, File::D)
        };
        Some((Square::make_square(rank, from), Square::make_square(rank, to)))
    }

    #[inline]
    pub fn is_queen_promotion(&self, mv: ChessMove) -> bool {
        mv.get_promotion() == Some(Piece::Queen)
    }

    /// Whether playing `mv` leaves the opponent in check.
    pub fn gives_check(&self, mv: ChessMove) -> bool {
        self.board().make_move_new(mv).checkers().popcnt() > 0
    }
}
