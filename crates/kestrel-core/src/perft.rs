//! Perft (performance test) driven through make/unmake.
//!
//! Besides counting nodes, every call checks that the position returns to
//! its starting state, which makes perft the regression test for the undo
//! stack.

use crate::position::Position;

/// Count the number of leaf nodes at the given depth.
///
/// Depth 0 returns 1 (the current position). Depth 1 returns the number
/// of legal moves without recursing.
pub fn perft(position: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        position.make_move(mv);
        nodes += perft(position, depth - 1);
        position.unmake_move();
    }
    nodes
}

/// Run perft with per-move breakdown.
///
/// Returns a vector of `(uci_move, node_count)` pairs sorted alphabetically.
pub fn divide(position: &mut Position, depth: usize) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = position
        .legal_moves()
        .into_iter()
        .map(|mv| {
            position.make_move(mv);
            let count = if depth <= 1 {
                1
            } else {
                perft(position, depth - 1)
            };
            position.unmake_move();
            (mv.to_string(), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kiwipete() -> Position {
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap()
    }

    #[test]
    fn perft_startpos_depth_3() {
        let mut position = Position::starting_position();
        assert_eq!(perft(&mut position, 3), 8_902);
        assert_eq!(position, Position::starting_position());
    }

    #[test]
    fn perft_kiwipete_depth_2() {
        let mut position = kiwipete();
        assert_eq!(perft(&mut position, 2), 2_039);
        assert_eq!(position, kiwipete());
        assert_eq!(position.depth(), 0);
    }

    #[test]
    fn perft_position_3_depth_3() {
        let mut position: Position = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();
        assert_eq!(perft(&mut position, 3), 2_812);
    }

    #[test]
    fn divide_startpos_sums_to_perft() {
        let mut position = Position::starting_position();
        let split = divide(&mut position, 2);
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert!(split.iter().all(|(_, n)| *n == 20));
    }
}
