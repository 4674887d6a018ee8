//! Core chess types: a make/unmake position over the `chess` rules engine.

mod error;
mod fen;
mod moves;
mod outcome;
mod perft;
mod position;

pub use chess::{ChessMove, Color, File, Piece, Rank, Square};
pub use error::PositionError;
pub use fen::STARTING_FEN;
pub use outcome::Outcome;
pub use perft::{divide, perft};
pub use position::{FIFTY_MOVE_PLIES, Position};
