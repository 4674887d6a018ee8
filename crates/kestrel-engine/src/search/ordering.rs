//! Move ordering by static priority buckets.
//!
//! Every legal move lands in exactly one bucket. Buckets are searched in
//! this order:
//!
//! | Bucket            | Contents                                              |
//! |-------------------|-------------------------------------------------------|
//! | Queen promotion   | any move promoting to a queen                         |
//! | Checking capture  | captures that give check                              |
//! | Good capture      | captures winning material by the [`CaptureRule`]      |
//! | Check             | non-capturing checks, near the window boundary only   |
//! | Bad capture       | remaining captures                                    |
//! | Quiet             | everything else; searched only below `min_depth` or in check |
//!
//! This is a static, per-node heuristic; there is no exchange search.

use kestrel_core::{ChessMove, Color, Position};
use serde::{Deserialize, Serialize};

use crate::eval::GameStage;
use crate::eval::material::exchange_value;
use crate::eval::pst::pst_value;

/// Number of plies past `min_depth` within which checks keep their own bucket.
pub const CHECK_HORIZON: u8 = 3;

/// How captures are split into good and bad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CaptureRule {
    /// Good when the victim's exchange value exceeds the attacker's.
    #[default]
    PieceValue,
    /// Good when winning the victim and then losing the attacker still
    /// gains more than `threshold` centipawns by the piece-square tables.
    Exchange { threshold: i32 },
}

/// Move ordering bucket, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    QueenPromotion = 0,
    CheckingCapture = 1,
    GoodCapture = 2,
    Check = 3,
    BadCapture = 4,
    Quiet = 5,
}

impl Bucket {
    pub const COUNT: usize = 6;
}

/// Legal moves of one node split into buckets.
#[derive(Debug, Default)]
pub struct ClassifiedMoves {
    buckets: [Vec<ChessMove>; Bucket::COUNT],
}

impl ClassifiedMoves {
    /// Moves in `bucket`, in generator order.
    pub fn bucket(&self, bucket: Bucket) -> &[ChessMove] {
        &self.buckets[bucket as usize]
    }

    /// Total number of classified moves.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate the buckets, dropping quiet moves unless `include_quiet`.
    pub fn into_ordered(self, include_quiet: bool) -> Vec<ChessMove> {
        let [promotions, checking_captures, good, checks, bad, quiet] = self.buckets;
        let mut ordered = Vec::with_capacity(
            promotions.len() + checking_captures.len() + good.len() + checks.len() + bad.len(),
        );
        ordered.extend(promotions);
        ordered.extend(checking_captures);
        ordered.extend(good);
        ordered.extend(checks);
        ordered.extend(bad);
        if include_quiet {
            ordered.extend(quiet);
        }
        ordered
    }
}

/// Splits legal moves into [`Bucket`]s.
#[derive(Debug, Clone, Copy)]
pub struct MoveClassifier {
    rule: CaptureRule,
    stage: GameStage,
}

impl MoveClassifier {
    pub fn new(rule: CaptureRule, stage: GameStage) -> Self {
        Self { rule, stage }
    }

    /// Classify `moves`. When `promote_checks` is false, non-capturing
    /// checks are filed as quiet moves.
    pub fn classify(
        &self,
        position: &Position,
        moves: &[ChessMove],
        promote_checks: bool,
    ) -> ClassifiedMoves {
        let mut classified = ClassifiedMoves::default();

        for &mv in moves {
            let bucket = if position.is_queen_promotion(mv) {
                Bucket::QueenPromotion
            } else if position.is_capture(mv) {
                if position.gives_check(mv) {
                    Bucket::CheckingCapture
                } else if self.is_good_capture(position, mv) {
                    Bucket::GoodCapture
                } else {
                    Bucket::BadCapture
                }
            } else if promote_checks && position.gives_check(mv) {
                Bucket::Check
            } else {
                Bucket::Quiet
            };
            classified.buckets[bucket as usize].push(mv);
        }

        classified
    }

    /// Ordered move list for a node at `depth` in a window starting at `min_depth`.
    ///
    /// Quiet moves are withheld at or past `min_depth` unless the side to
    /// move is in check; the standing-pat score covers them instead.
    pub fn order(
        &self,
        position: &Position,
        moves: &[ChessMove],
        depth: u8,
        min_depth: u8,
        in_check: bool,
    ) -> Vec<ChessMove> {
        let promote_checks = u16::from(depth) < u16::from(min_depth) + u16::from(CHECK_HORIZON);
        let include_quiet = depth < min_depth || in_check;
        self.classify(position, moves, promote_checks)
            .into_ordered(include_quiet)
    }

    fn is_good_capture(&self, position: &Position, mv: ChessMove) -> bool {
        let Some(attacker) = position.moving_piece(mv) else {
            return false;
        };
        let Some(victim) = position.captured_piece(mv) else {
            return false;
        };

        match self.rule {
            CaptureRule::PieceValue => exchange_value(victim) > exchange_value(attacker),
            CaptureRule::Exchange { threshold } => {
                let us = position.side_to_move();
                let victim_sq = if position.is_en_passant(mv) {
                    position.en_passant_victim(mv)
                } else {
                    mv.get_dest()
                };
                // White-positive: we lose the attacker, the opponent loses the victim.
                let swing = -pst_value(attacker, us, mv.get_source(), self.stage)
                    - pst_value(victim, !us, victim_sq, self.stage);
                let relative = match us {
                    Color::White => swing,
                    Color::Black => -swing,
                };
                relative > threshold
            }
        }
    }
}
