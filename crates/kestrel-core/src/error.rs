//! Error types for FEN parsing and move input.

/// Errors produced while building or driving a [`Position`](crate::Position).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The board part of the FEN was rejected by the rules engine.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move counter (halfmove clock or fullmove number) is not a valid number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter {
        /// The field name ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The invalid string.
        found: String,
    },

    /// A move string does not name a legal move in the current position.
    #[error("illegal move: {uci_move}")]
    IllegalMove {
        /// The offending move in coordinate notation.
        uci_move: String,
    },
}
