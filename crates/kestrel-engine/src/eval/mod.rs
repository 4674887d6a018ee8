//! Static evaluation and the incremental delta contract.
//!
//! Scores are centipawns from White's perspective. The search keeps a
//! running score and adds [`Evaluator::delta_for_move`] for every move it
//! plays, so every evaluator must satisfy
//!
//! ```text
//! static_score(after) == static_score(before) + delta_for_move(before, mv)
//! ```
//!
//! for a fixed [`GameStage`].

pub mod material;
pub mod pst;
pub mod stage;
pub mod structure;

use kestrel_core::{ChessMove, Color, Piece, Position};

pub use material::Material;
pub use stage::{GameStage, StageThresholds};
pub use structure::EvalState;

use pst::pst_value;

/// A position scorer usable by the search.
pub trait Evaluator: Send + Sync {
    /// Full evaluation of `position` from White's perspective.
    fn static_score(&self, position: &Position, stage: GameStage) -> i32;

    /// Score change caused by playing `mv` from `position`.
    ///
    /// `state` holds the structural counters for `position` and must be
    /// left describing the position after `mv`. The default rescans the
    /// position on both sides of the move; `position` is restored before
    /// returning.
    fn delta_for_move(
        &self,
        position: &mut Position,
        mv: ChessMove,
        stage: GameStage,
        state: &mut EvalState,
    ) -> i32 {
        let before = self.static_score(position, stage);
        state.apply_move(position, mv);
        position.make_move(mv);
        let after = self.static_score(position, stage);
        position.unmake_move();
        after - before
    }
}

/// Table-driven evaluator: piece-square tables plus structural terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pst;

impl Pst {
    /// Sum of all piece-square values on the board.
    fn placement(position: &Position, stage: GameStage) -> i32 {
        let board = position.board();
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let own = *board.color_combined(color);
            for piece in chess::ALL_PIECES {
                for sq in *board.pieces(piece) & own {
                    score += pst_value(piece, color, sq, stage);
                }
            }
        }
        score
    }

    /// Piece-square change caused by `mv`, without structural terms.
    fn placement_delta(position: &Position, mv: ChessMove, stage: GameStage) -> i32 {
        let Some(mover) = position.moving_piece(mv) else {
            return 0;
        };
        let us = position.side_to_move();
        let them = !us;
        let from = mv.get_source();
        let to = mv.get_dest();

        let mut delta = -pst_value(mover, us, from, stage);
        delta += pst_value(mv.get_promotion().unwrap_or(mover), us, to, stage);

        if position.is_en_passant(mv) {
            delta -= pst_value(Piece::Pawn, them, position.en_passant_victim(mv), stage);
        } else if let Some(captured) = position.captured_piece(mv) {
            delta -= pst_value(captured, them, to, stage);
        }

        if let Some((rook_from, rook_to)) = position.castling_rook(mv) {
            delta -= pst_value(Piece::Rook, us, rook_from, stage);
            delta += pst_value(Piece::Rook, us, rook_to, stage);
        }

        delta
    }
}

impl Evaluator for Pst {
    fn static_score(&self, position: &Position, stage: GameStage) -> i32 {
        Self::placement(position, stage) + EvalState::from_position(position).score()
    }

    fn delta_for_move(
        &self,
        position: &mut Position,
        mv: ChessMove,
        stage: GameStage,
        state: &mut EvalState,
    ) -> i32 {
        let placement = Self::placement_delta(position, mv, stage);
        let before = state.score();
        state.apply_move(position, mv);
        placement + state.score() - before
    }
}
