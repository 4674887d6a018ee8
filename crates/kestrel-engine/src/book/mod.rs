//! Opening book move selection.
//!
//! Before each search the session asks the [`OpeningSelector`] for a move.
//! A branch node is sampled with weights that fall off exponentially with
//! the distance from the best candidate's evaluation:
//!
//! ```text
//! weight(m) = (2 - coefficient) ^ -|eval(m) - best_eval|
//! ```
//!
//! A leaf node's stored line is played deterministically and the book is
//! left for good. The first miss also leaves the book for the rest of the
//! game; the last cached line is still replayed while the opponent
//! follows it.

pub mod repository;

use std::collections::VecDeque;

use kestrel_core::{ChessMove, Position};
use rand::Rng;
use tracing::{debug, info, warn};

pub use repository::{BookMove, EmptyBook, JsonBook, OpeningBook, OpeningNode};

/// A cached reply: play `uci` when the position key is `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedMove {
    key: u64,
    uci: String,
}

/// Chooses book moves for one game.
pub struct OpeningSelector {
    book: Box<dyn OpeningBook>,
    coefficient: f64,
    active: bool,
    line: VecDeque<CachedMove>,
}

impl OpeningSelector {
    pub fn new(book: Box<dyn OpeningBook>, coefficient: f64) -> Self {
        Self {
            book,
            coefficient,
            active: true,
            line: VecDeque::new(),
        }
    }

    /// Whether the book is still consulted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Re-enable the book and drop the cached line for a new game.
    pub fn reset(&mut self) {
        self.active = true;
        self.line.clear();
    }

    /// Book move for `position`, or `None` to defer to the search.
    pub fn select<R: Rng + ?Sized>(&mut self, position: &Position, rng: &mut R) -> Option<ChessMove> {
        if self.active {
            if let Some(mv) = self.consult(position, rng) {
                return Some(mv);
            }
        }
        self.replay(position)
    }

    fn consult<R: Rng + ?Sized>(&mut self, position: &Position, rng: &mut R) -> Option<ChessMove> {
        let node = match self.book.lookup(position.key()) {
            Ok(Some(node)) => node,
            Ok(None) => {
                debug!(fen = %position, "book miss, leaving book");
                self.active = false;
                return None;
            }
            Err(err) => {
                warn!(error = %err, "opening book lookup failed, leaving book");
                self.active = false;
                return None;
            }
        };

        if node.is_branch() {
            self.play_branch(position, &node, rng)
        } else {
            self.play_leaf(position, &node)
        }
    }

    fn play_branch<R: Rng + ?Sized>(
        &mut self,
        position: &Position,
        node: &OpeningNode,
        rng: &mut R,
    ) -> Option<ChessMove> {
        let candidate = sample_move(&node.moves, self.coefficient, rng.gen_range(0.0..1.0))?;
        let Ok(mv) = position.parse_uci_move(&candidate.uci) else {
            warn!(uci_move = %candidate.uci, "illegal book move, leaving book");
            self.active = false;
            return None;
        };
        info!(uci_move = %candidate.uci, eval = candidate.eval, "book branch move");

        let mut child = position.clone();
        child.make_move(mv);
        match self.book.lookup(child.key()) {
            Ok(Some(next)) if !next.pv.is_empty() => self.cache_line(&child, &next.pv),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "opening book lookup failed for reply line"),
        }
        Some(mv)
    }

    fn play_leaf(&mut self, position: &Position, node: &OpeningNode) -> Option<ChessMove> {
        self.active = false;
        let (first, rest) = node.pv.split_first()?;
        let Ok(mv) = position.parse_uci_move(first) else {
            warn!(uci_move = %first, "illegal book line, leaving book");
            return None;
        };
        info!(uci_move = %first, eval = node.eval, "book leaf, leaving book");

        let mut after = position.clone();
        after.make_move(mv);
        self.cache_line(&after, rest);
        Some(mv)
    }

    /// Cache our replies along `pv`, which starts with the opponent's move from `start`.
    fn cache_line(&mut self, start: &Position, pv: &[String]) {
        self.line.clear();
        let mut position = start.clone();
        for pair in pv.chunks(2) {
            let Ok(theirs) = position.parse_uci_move(&pair[0]) else {
                break;
            };
            position.make_move(theirs);

            let Some(ours) = pair.get(1) else {
                break;
            };
            let Ok(mv) = position.parse_uci_move(ours) else {
                break;
            };
            self.line.push_back(CachedMove {
                key: position.key(),
                uci: ours.clone(),
            });
            position.make_move(mv);
        }
        debug!(replies = self.line.len(), "cached book line");
    }

    /// Next cached reply if the game is still on the cached line.
    fn replay(&mut self, position: &Position) -> Option<ChessMove> {
        let next = self.line.pop_front()?;
        if next.key != position.key() {
            self.line.clear();
            return None;
        }
        match position.parse_uci_move(&next.uci) {
            Ok(mv) => {
                debug!(uci_move = %next.uci, "replaying cached book line");
                Some(mv)
            }
            Err(_) => {
                self.line.clear();
                None
            }
        }
    }
}

/// Normalised sampling weights for `moves`.
pub fn weights(moves: &[BookMove], coefficient: f64) -> Vec<f64> {
    let Some(best) = moves.iter().map(|m| m.eval).max() else {
        return Vec::new();
    };
    let base = 2.0 - coefficient;
    let raw: Vec<f64> = moves
        .iter()
        .map(|m| base.powf(-f64::from((m.eval - best).abs())))
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Pick a candidate with the uniform draw `r` in `[0, 1)` against the
/// cumulative weights. Rounding leftovers fall to the last candidate.
pub fn sample_move(moves: &[BookMove], coefficient: f64, r: f64) -> Option<&BookMove> {
    let mut cumulative = 0.0;
    for (candidate, weight) in moves.iter().zip(weights(moves, coefficient)) {
        cumulative += weight;
        if r <= cumulative {
            return Some(candidate);
        }
    }
    moves.last()
}
