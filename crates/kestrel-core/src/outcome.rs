//! Terminal results as seen by the side to move.

use std::fmt;

/// Result of a finished game from the perspective of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Neither side wins (stalemate, fifty-move rule, repetition).
    Draw,
    /// The side to move has lost (checkmate).
    Loss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Draw => write!(f, "draw"),
            Outcome::Loss => write!(f, "loss"),
        }
    }
}
