//! Game stage classification from remaining material and move number.

use std::fmt;

use kestrel_core::Position;
use serde::{Deserialize, Serialize};

/// Coarse phase of the game.
///
/// Selects the king table in [`Pst`](crate::eval::Pst), the expected number
/// of remaining moves for time allocation, and disables null-move pruning
/// in the endgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStage {
    Early,
    Mid,
    End,
}

/// Boundaries between the stages.
///
/// | Stage | Condition                                                  |
/// |-------|------------------------------------------------------------|
/// | END   | non-king pieces `<= end_max_pieces`                        |
/// | MID   | non-king pieces `<= mid_max_pieces` or move `>= mid_from_move` |
/// | EARLY | otherwise                                                  |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageThresholds {
    pub end_max_pieces: u32,
    pub mid_max_pieces: u32,
    pub mid_from_move: u32,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            end_max_pieces: 12,
            mid_max_pieces: 29,
            mid_from_move: 6,
        }
    }
}

impl GameStage {
    /// Classify `position`.
    pub fn detect(position: &Position, thresholds: &StageThresholds) -> Self {
        let pieces = position.non_king_piece_count();
        if pieces <= thresholds.end_max_pieces {
            GameStage::End
        } else if pieces <= thresholds.mid_max_pieces
            || position.fullmove_number() >= thresholds.mid_from_move
        {
            GameStage::Mid
        } else {
            GameStage::Early
        }
    }
}

impl fmt::Display for GameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStage::Early => write!(f, "early"),
            GameStage::Mid => write!(f, "mid"),
            GameStage::End => write!(f, "end"),
        }
    }
}
