//! FEN parsing and serialization for [`Position`].
//!
//! The rules engine parses the first four fields (placement, side to move,
//! castling rights, en passant square). The move counters in fields five and
//! six are parsed here because the rules engine does not track them.

use std::fmt;
use std::str::FromStr;

use chess::Board;

use crate::error::PositionError;
use crate::position::Position;

/// The FEN string for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(fen: &str) -> Result<Position, PositionError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(PositionError::InvalidFen {
                fen: fen.to_string(),
            });
        }

        let board = Board::from_str(&fields[..4].join(" ")).map_err(|_| {
            PositionError::InvalidFen {
                fen: fen.to_string(),
            }
        })?;

        let halfmove_clock = match fields.get(4) {
            Some(field) => parse_counter(field, "halfmove clock")?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(field) => parse_counter(field, "fullmove number")?.max(1),
            None => 1,
        };

        Ok(Position::from_parts(board, halfmove_clock, fullmove_number))
    }
}

fn parse_counter(field: &str, name: &'static str) -> Result<u32, PositionError> {
    field
        .parse()
        .map_err(|_| PositionError::InvalidMoveCounter {
            field: name,
            found: field.to_string(),
        })
}

impl Position {
    /// The position as a six-field FEN string.
    pub fn fen(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Position {
    /// Writes the position as a six-field FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board_fen = self.board().to_string();
        let head: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        write!(
            f,
            "{} {} {}",
            head.join(" "),
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}
