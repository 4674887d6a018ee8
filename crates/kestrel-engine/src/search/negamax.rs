//! Negamax alpha-beta search with null-move pruning and standing pat.

use kestrel_core::{ChessMove, Color, Outcome, Position};

use crate::eval::{EvalState, Evaluator, GameStage};
use crate::search::SearchWindow;
use crate::search::ordering::{CaptureRule, MoveClassifier};
use crate::search::repetition::RepetitionTable;

/// Score sentinel reserved for proven mate.
pub const INF: i32 = 32_767;

/// Bonus for having the move at a leaf; the standing-pat score pays it back.
pub const TEMPO: i32 = 10;

/// Margin by which the static score must beat `beta` before a null move is tried.
pub const NULL_MOVE_MARGIN: i32 = 100;

/// Null moves need more than this many plies left before `min_depth`.
pub const NULL_MOVE_DISTANCE: u8 = 2;

/// `+1` for White, `-1` for Black.
#[inline]
pub(crate) fn polarity(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Search state threaded through negamax calls.
pub(crate) struct SearchContext<'a> {
    /// Nodes visited.
    pub nodes: u64,
    pub evaluator: &'a dyn Evaluator,
    /// Stage pinned at the root.
    pub stage: GameStage,
    pub classifier: MoveClassifier,
    /// Game history plus the current search line.
    pub repetition: &'a mut RepetitionTable,
    /// Structural counters for the current node.
    pub eval_state: EvalState,
    /// Running White-positive score for the current node.
    pub eval: i32,
}

impl<'a> SearchContext<'a> {
    /// Context rooted at `position`, with a full static evaluation.
    pub(crate) fn new(
        position: &Position,
        evaluator: &'a dyn Evaluator,
        stage: GameStage,
        capture_rule: CaptureRule,
        repetition: &'a mut RepetitionTable,
    ) -> Self {
        Self {
            nodes: 0,
            evaluator,
            stage,
            classifier: MoveClassifier::new(capture_rule, stage),
            repetition,
            eval_state: EvalState::from_position(position),
            eval: evaluator.static_score(position, stage),
        }
    }
}

/// Negamax alpha-beta search.
///
/// Returns the score for the side to move and the best move found. The
/// move is `None` when a terminal rule fired or the null-move probe cut
/// the node off. `position`, the running score and the repetition counts
/// are back to their entry state on every return path.
pub(crate) fn alpha_beta(
    position: &mut Position,
    depth: u8,
    ply: u8,
    window: SearchWindow,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> (i32, Option<ChessMove>) {
    ctx.nodes += 1;

    match position.halfmove_outcome() {
        Some(Outcome::Loss) => return (-INF, None),
        Some(Outcome::Draw) => return (0, None),
        None => {}
    }

    let key = position.key();
    if ctx.repetition.is_draw(key) {
        return (0, None);
    }

    let moves = position.legal_moves();
    let in_check = position.in_check();
    let Some(&first) = moves.first() else {
        return (if in_check { -INF } else { 0 }, None);
    };

    let relative = polarity(position.side_to_move()) * ctx.eval;

    if depth >= window.max_depth {
        return (relative + TEMPO, Some(first));
    }

    if ply > 0
        && ctx.stage != GameStage::End
        && !in_check
        && window.min_depth.saturating_sub(depth) > NULL_MOVE_DISTANCE
        && relative - NULL_MOVE_MARGIN > beta
    {
        if let Some(score) = null_move_probe(position, depth, ply, window, beta, ctx) {
            if score >= beta {
                return (score, None);
            }
        }
    }

    let ordered = ctx
        .classifier
        .order(position, &moves, depth, window.min_depth, in_check);

    let mut best = -INF;
    let mut best_move = first;

    // Standing pat: quiet moves were withheld, so the static score stands in for them.
    if depth >= window.min_depth && !in_check {
        let pat = relative - TEMPO;
        if pat >= beta {
            return (pat, Some(first));
        }
        best = pat;
    }

    let evaluator = ctx.evaluator;
    for mv in ordered {
        let saved_state = ctx.eval_state;
        let saved_eval = ctx.eval;
        ctx.eval += evaluator.delta_for_move(position, mv, ctx.stage, &mut ctx.eval_state);

        position.make_move(mv);
        ctx.repetition.increment(key);
        let (child, _) = alpha_beta(position, depth + 1, ply + 1, window, -beta, -alpha, ctx);
        ctx.repetition.decrement(key);
        position.unmake_move();

        ctx.eval_state = saved_state;
        ctx.eval = saved_eval;

        let score = -child;
        if score > best {
            best = score;
            best_move = mv;
        }
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    (best, Some(best_move))
}

/// Pass the turn and search the opponent with a null window around `beta`.
///
/// Returns the score from the passing side's view, or `None` when the
/// pass is illegal or leaves the opponent without a move.
fn null_move_probe(
    position: &mut Position,
    depth: u8,
    ply: u8,
    window: SearchWindow,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    if !position.make_null_move() {
        return None;
    }

    let score = if position.has_legal_moves() {
        let remaining = window.min_depth - depth;
        let probe = SearchWindow {
            min_depth: remaining - NULL_MOVE_DISTANCE,
            max_depth: remaining,
        };
        let (score, _) = alpha_beta(position, 0, ply + 1, probe, -beta, -beta + 1, ctx);
        Some(-score)
    } else {
        None
    };

    position.unmake_null_move();
    score
}
