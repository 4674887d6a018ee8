//! Piece-square tables with material folded in.
//!
//! All tables are defined from White's perspective in LERF order:
//! index 0 = A1, index 7 = H1, index 8 = A2, ..., index 63 = H8.
//! Each entry is the full worth of the piece on that square, so a single
//! lookup replaces a material count plus a positional bonus.
//! Use [`pst_value`] to look up the signed value for either color.

use kestrel_core::{Color, Piece, Square};

use crate::eval::GameStage;

/// Pawn table. Ranks 1 and 8 are never occupied by a pawn.
#[rustfmt::skip]
const PAWN: [i16; 64] = [
    // Rank 1
      0,   0,   0,   0,   0,   0,   0,   0,
    // Rank 2
     90,  95,  95,  90,  90, 100,  95,  90,
    // Rank 3
     95,  95,  95, 105, 105,  90,  90,  95,
    // Rank 4
     90,  90, 100, 125, 125,  95,  90,  90,
    // Rank 5
    105, 105, 120, 140, 140, 120, 105, 105,
    // Rank 6
    125, 130, 140, 150, 150, 140, 130, 125,
    // Rank 7
    170, 180, 190, 210, 210, 190, 180, 170,
    // Rank 8
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i16; 64] = [
    // Rank 1
    240, 270, 280, 280, 280, 280, 270, 240,
    // Rank 2
    270, 290, 310, 315, 315, 310, 290, 270,
    // Rank 3
    280, 310, 315, 330, 330, 315, 310, 280,
    // Rank 4
    280, 315, 330, 335, 335, 330, 315, 280,
    // Rank 5
    280, 315, 330, 335, 335, 330, 315, 280,
    // Rank 6
    280, 310, 320, 330, 330, 320, 310, 280,
    // Rank 7
    270, 290, 310, 315, 315, 310, 290, 270,
    // Rank 8
    240, 270, 280, 280, 280, 280, 270, 240,
];

#[rustfmt::skip]
const BISHOP: [i16; 64] = [
    // Rank 1
    280, 290, 290, 290, 290, 290, 290, 280,
    // Rank 2
    290, 315, 300, 305, 305, 300, 315, 290,
    // Rank 3
    300, 310, 315, 315, 315, 315, 310, 300,
    // Rank 4
    300, 310, 320, 320, 320, 320, 310, 300,
    // Rank 5
    295, 315, 320, 320, 320, 320, 315, 295,
    // Rank 6
    300, 310, 315, 315, 315, 315, 310, 300,
    // Rank 7
    290, 300, 300, 300, 300, 300, 300, 290,
    // Rank 8
    280, 290, 290, 290, 290, 290, 290, 280,
];

#[rustfmt::skip]
const ROOK: [i16; 64] = [
    // Rank 1
    490, 495, 500, 510, 510, 505, 495, 490,
    // Rank 2
    485, 495, 500, 505, 505, 500, 495, 485,
    // Rank 3
    490, 500, 500, 500, 500, 500, 500, 490,
    // Rank 4
    490, 500, 500, 500, 500, 500, 500, 490,
    // Rank 5
    490, 500, 500, 500, 500, 500, 500, 490,
    // Rank 6
    495, 500, 500, 500, 500, 500, 500, 495,
    // Rank 7
    520, 525, 525, 530, 530, 525, 525, 520,
    // Rank 8
    505, 505, 505, 510, 510, 505, 505, 505,
];

#[rustfmt::skip]
const QUEEN: [i16; 64] = [
    // Rank 1
    870, 880, 890, 900, 900, 890, 880, 870,
    // Rank 2
    880, 895, 900, 905, 905, 900, 895, 880,
    // Rank 3
    890, 905, 910, 910, 910, 910, 905, 890,
    // Rank 4
    900, 905, 910, 910, 910, 910, 905, 900,
    // Rank 5
    900, 905, 910, 910, 910, 910, 905, 900,
    // Rank 6
    895, 900, 910, 910, 910, 910, 900, 895,
    // Rank 7
    900, 905, 905, 905, 905, 905, 905, 900,
    // Rank 8
    890, 900, 905, 905, 905, 905, 900, 890,
];

/// King table for EARLY and MID: reward the castled corners.
#[rustfmt::skip]
const KING_SHELTER: [i16; 64] = [
    // Rank 1
     10,  20,  15, -10,   0, -10,  25,  10,
    // Rank 2
      0,   5,  -5, -15, -15,  -5,   5,   0,
    // Rank 3
    -15, -20, -25, -30, -30, -25, -20, -15,
    // Rank 4
    -25, -30, -35, -40, -40, -35, -30, -25,
    // Rank 5
    -30, -35, -40, -45, -45, -40, -35, -30,
    // Rank 6
    -30, -35, -40, -45, -45, -40, -35, -30,
    // Rank 7
    -30, -35, -40, -45, -45, -40, -35, -30,
    // Rank 8
    -30, -35, -40, -45, -45, -40, -35, -30,
];

/// King table for END: walk to the centre.
#[rustfmt::skip]
const KING_CENTRE: [i16; 64] = [
    // Rank 1
    -40, -30, -20, -15, -15, -20, -30, -40,
    // Rank 2
    -30, -15,  -5,   0,   0,  -5, -15, -30,
    // Rank 3
    -20,  -5,  10,  15,  15,  10,  -5, -20,
    // Rank 4
    -15,   0,  15,  25,  25,  15,   0, -15,
    // Rank 5
    -15,   0,  15,  25,  25,  15,   0, -15,
    // Rank 6
    -20,  -5,  10,  15,  15,  10,  -5, -20,
    // Rank 7
    -30, -15,  -5,   0,   0,  -5, -15, -30,
    // Rank 8
    -40, -30, -20, -15, -15, -20, -30, -40,
];

fn table(piece: Piece, stage: GameStage) -> &'static [i16; 64] {
    match piece {
        Piece::Pawn => &PAWN,
        Piece::Knight => &KNIGHT,
        Piece::Bishop => &BISHOP,
        Piece::Rook => &ROOK,
        Piece::Queen => &QUEEN,
        Piece::King => match stage {
            GameStage::End => &KING_CENTRE,
            GameStage::Early | GameStage::Mid => &KING_SHELTER,
        },
    }
}

/// Signed table value of `piece` of `color` on `sq`.
///
/// White pieces score positive, Black pieces negative. Black squares are
/// mirrored vertically (`sq ^ 56`) so both sides share the same tables.
#[inline]
pub fn pst_value(piece: Piece, color: Color, sq: Square, stage: GameStage) -> i32 {
    let index = match color {
        Color::White => sq.to_index(),
        Color::Black => sq.to_index() ^ 56,
    };
    let value = i32::from(table(piece, stage)[index]);
    match color {
        Color::White => value,
        Color::Black => -value,
    }
}
