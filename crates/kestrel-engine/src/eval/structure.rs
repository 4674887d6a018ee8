//! Structural evaluation terms maintained incrementally.
//!
//! [`EvalState`] tracks per-file pawn and rook counts and bishop counts for
//! both sides. The search copies it before each move, updates it in O(1)
//! with [`EvalState::apply_move`] and restores the copy on unmake, so the
//! structural score never needs a board scan inside the tree.

use kestrel_core::{ChessMove, Color, Piece, Position};

/// Penalty unit per pawn island beyond the first (isolated islands count twice).
const ISLAND_PENALTY_UNIT: i32 = -15;

/// Penalty per extra pawn on a file.
const DOUBLED_PAWN: i32 = -12;

/// Bonus for owning two or more bishops.
const BISHOP_PAIR: i32 = 40;

/// Bonus for a rook on a file without pawns.
const ROOK_OPEN_FILE: i32 = 25;

/// Bonus for a rook on a file without friendly pawns.
const ROOK_SEMI_OPEN_FILE: i32 = 12;

/// Island penalty indexed by an 8-bit pawn file mask (bit 0 = a-file).
///
/// For each mask: `-15 * max(0, islands + isolated - 1)`, where an island is
/// a run of adjacent occupied files and an isolated island is one file wide.
static ISLAND_PENALTY: [i32; 256] = {
    let mut table = [0i32; 256];
    let mut mask = 0;
    while mask < 256 {
        let mut islands = 0;
        let mut isolated = 0;
        let mut run = 0;
        let mut file = 0;
        while file <= 8 {
            let occupied = file < 8 && (mask >> file) & 1 == 1;
            if occupied {
                run += 1;
            } else if run > 0 {
                islands += 1;
                if run == 1 {
                    isolated += 1;
                }
                run = 0;
            }
            file += 1;
        }
        let weaknesses = islands + isolated - 1;
        table[mask] = if weaknesses > 0 {
            ISLAND_PENALTY_UNIT * weaknesses
        } else {
            0
        };
        mask += 1;
    }
    table
};

/// Incrementally maintained structural counters for both sides.
///
/// Indexed by [`Color::to_index()`] and then by file (0 = a-file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalState {
    pawns_on_file: [[u8; 8]; 2],
    rooks_on_file: [[u8; 8]; 2],
    bishops: [u8; 2],
}

impl EvalState {
    /// Build the counters from scratch.
    pub fn from_position(position: &Position) -> Self {
        let board = position.board();
        let mut state = Self::default();

        for color in [Color::White, Color::Black] {
            let own = *board.color_combined(color);
            let side = color.to_index();

            for sq in *board.pieces(Piece::Pawn) & own {
                state.pawns_on_file[side][sq.get_file().to_index()] += 1;
            }
            for sq in *board.pieces(Piece::Rook) & own {
                state.rooks_on_file[side][sq.get_file().to_index()] += 1;
            }
            state.bishops[side] = (*board.pieces(Piece::Bishop) & own).popcnt() as u8;
        }

        state
    }

    /// Update the counters for `mv`, which is about to be played from `position`.
    pub fn apply_move(&mut self, position: &Position, mv: ChessMove) {
        let Some(mover) = position.moving_piece(mv) else {
            return;
        };
        let us = position.side_to_move().to_index();
        let them = 1 - us;
        let from_file = mv.get_source().get_file().to_index();
        let to_file = mv.get_dest().get_file().to_index();

        if let Some(captured) = position.captured_piece(mv) {
            // En passant victims share the destination file.
            self.remove(them, captured, to_file);
        }

        self.remove(us, mover, from_file);
        self.add(us, mv.get_promotion().unwrap_or(mover), to_file);

        if let Some((rook_from, rook_to)) = position.castling_rook(mv) {
            self.remove(us, Piece::Rook, rook_from.get_file().to_index());
            self.add(us, Piece::Rook, rook_to.get_file().to_index());
        }
    }

    fn add(&mut self, side: usize, piece: Piece, file: usize) {
        match piece {
            Piece::Pawn => self.pawns_on_file[side][file] += 1,
            Piece::Rook => self.rooks_on_file[side][file] += 1,
            Piece::Bishop => self.bishops[side] += 1,
            _ => {}
        }
    }

    fn remove(&mut self, side: usize, piece: Piece, file: usize) {
        let counter = match piece {
            Piece::Pawn => &mut self.pawns_on_file[side][file],
            Piece::Rook => &mut self.rooks_on_file[side][file],
            Piece::Bishop => &mut self.bishops[side],
            _ => return,
        };
        debug_assert!(*counter > 0, "structural counter underflow for {piece:?}");
        *counter = counter.saturating_sub(1);
    }

    fn pawn_mask(&self, side: usize) -> u8 {
        self.pawns_on_file[side]
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .fold(0u8, |mask, (file, _)| mask | (1 << file))
    }

    fn side_score(&self, side: usize) -> i32 {
        let other = 1 - side;
        let mut score = ISLAND_PENALTY[self.pawn_mask(side) as usize];

        for count in self.pawns_on_file[side] {
            if count > 1 {
                score += DOUBLED_PAWN * i32::from(count - 1);
            }
        }

        if self.bishops[side] >= 2 {
            score += BISHOP_PAIR;
        }

        for file in 0..8 {
            let rooks = i32::from(self.rooks_on_file[side][file]);
            if rooks == 0 || self.pawns_on_file[side][file] > 0 {
                continue;
            }
            score += if self.pawns_on_file[other][file] == 0 {
                ROOK_OPEN_FILE * rooks
            } else {
                ROOK_SEMI_OPEN_FILE * rooks
            };
        }

        score
    }

    /// Structural score from White's perspective.
    pub fn score(&self) -> i32 {
        self.side_score(Color::White.to_index()) - self.side_score(Color::Black.to_index())
    }
}
