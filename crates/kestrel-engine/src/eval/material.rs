//! Material values and the plain material evaluator.
//!
//! All scores are returned from White's perspective (positive = White ahead).

use kestrel_core::{Color, Piece, Position};

use crate::eval::{Evaluator, GameStage};

/// Base material values indexed by [`Piece::to_index()`].
///
/// | Piece  | Value |
/// |--------|-------|
/// | Pawn   | 100   |
/// | Knight | 300   |
/// | Bishop | 300   |
/// | Rook   | 500   |
/// | Queen  | 900   |
/// | King   | 0     |
pub const MATERIAL_VALUE: [i32; 6] = [100, 300, 300, 500, 900, 0];

/// Values used to decide whether a capture wins material.
///
/// Strictly increasing in piece order, so a knight taking a bishop counts
/// as good and the king never gains by capturing.
pub const EXCHANGE_VALUE: [i32; 6] = [100, 300, 310, 500, 900, 10_000];

#[inline]
pub fn exchange_value(piece: Piece) -> i32 {
    EXCHANGE_VALUE[piece.to_index()]
}

/// Evaluator that counts material only.
///
/// It does not override [`Evaluator::delta_for_move`], so deltas are
/// computed by rescoring the position after the move.
#[derive(Debug, Clone, Copy, Default)]
pub struct Material;

impl Evaluator for Material {
    fn static_score(&self, position: &Position, _stage: GameStage) -> i32 {
        let board = position.board();
        let white = *board.color_combined(Color::White);
        let black = *board.color_combined(Color::Black);

        chess::ALL_PIECES
            .iter()
            .map(|&piece| {
                let pieces = *board.pieces(piece);
                let diff = (pieces & white).popcnt() as i32 - (pieces & black).popcnt() as i32;
                MATERIAL_VALUE[piece.to_index()] * diff
            })
            .sum()
    }
}
