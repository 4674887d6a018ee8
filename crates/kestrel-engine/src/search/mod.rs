//! Search algorithms and move ordering.

pub mod control;
pub mod negamax;
pub mod ordering;
pub mod repetition;

use std::sync::Arc;
use std::time::Duration;

use kestrel_core::{ChessMove, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eval::{Evaluator, GameStage, Pst, StageThresholds};
use control::SearchControl;
use negamax::{INF, SearchContext, alpha_beta};
use ordering::CaptureRule;
use repetition::RepetitionTable;

/// Depth bounds for one search round.
///
/// Below `min_depth` every legal move is searched; from `min_depth` on only
/// forcing moves are, backed by the standing-pat score. Nodes at
/// `max_depth` return the static score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub min_depth: u8,
    pub max_depth: u8,
}

/// How the depth window grows between iterative-deepening rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepthSchedule {
    pub first_min: u8,
    pub first_max: u8,
    pub min_step: u8,
    pub max_step: u8,
    /// Hard cap on `max_depth`.
    pub limit: u8,
}

impl Default for DepthSchedule {
    fn default() -> Self {
        Self {
            first_min: 5,
            first_max: 14,
            min_step: 1,
            max_step: 2,
            limit: 64,
        }
    }
}

impl DepthSchedule {
    /// The same schedule with `max_depth` capped at `limit`.
    pub fn capped(self, limit: u8) -> Self {
        let limit = limit.min(self.limit).max(1);
        let first_max = self.first_max.min(limit);
        Self {
            first_min: self.first_min.min(first_max),
            first_max,
            limit,
            ..self
        }
    }

    /// Window of the first round.
    pub fn first_window(&self) -> SearchWindow {
        let max_depth = self.first_max.min(self.limit);
        SearchWindow {
            min_depth: self.first_min.min(max_depth),
            max_depth,
        }
    }

    /// Window of the round after `window`.
    pub fn widen(&self, window: SearchWindow) -> SearchWindow {
        let max_depth = window.max_depth.saturating_add(self.max_step).min(self.limit);
        SearchWindow {
            min_depth: window.min_depth.saturating_add(self.min_step).min(max_depth),
            max_depth,
        }
    }
}

/// Progress after one completed iterative-deepening round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub window: SearchWindow,
    /// Score for the side to move at the root.
    pub score: i32,
    pub best_move: Option<ChessMove>,
    /// Nodes visited since the search started.
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move of the last completed round; `None` only without legal moves.
    pub best_move: Option<ChessMove>,
    /// Score for the side to move at the root.
    pub score: i32,
    /// Total nodes visited.
    pub nodes: u64,
    /// Window of the last completed round.
    pub window: SearchWindow,
    /// Rounds completed.
    pub iterations: u32,
}

impl SearchResult {
    /// Whether the score proves a forced mate for either side.
    pub fn is_mate(&self) -> bool {
        self.score.abs() >= INF
    }
}

/// Iterative-deepening driver around [`alpha_beta`].
pub struct Searcher {
    evaluator: Arc<dyn Evaluator>,
    schedule: DepthSchedule,
    capture_rule: CaptureRule,
    stages: StageThresholds,
}

impl Searcher {
    /// Searcher with default tuning.
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            evaluator,
            schedule: DepthSchedule::default(),
            capture_rule: CaptureRule::default(),
            stages: StageThresholds::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: DepthSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_capture_rule(mut self, capture_rule: CaptureRule) -> Self {
        self.capture_rule = capture_rule;
        self
    }

    pub fn with_stage_thresholds(mut self, stages: StageThresholds) -> Self {
        self.stages = stages;
        self
    }

    /// Run iterative deepening from `position`.
    ///
    /// `repetition` must hold the game history; it is returned unchanged.
    /// Rounds always run to completion. Before each round after the first,
    /// the search stops if `control` says so, the last score proved a mate,
    /// or the window reached the depth limit. `on_iter` is called after
    /// every round.
    pub fn search<F>(
        &self,
        position: &mut Position,
        repetition: &mut RepetitionTable,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(&IterationReport),
    {
        let stage = GameStage::detect(position, &self.stages);
        let fallback = position.legal_moves().first().copied();
        let mut window = self.schedule.first_window();
        let mut result = SearchResult {
            best_move: fallback,
            score: 0,
            nodes: 0,
            window,
            iterations: 0,
        };

        loop {
            let mut ctx = SearchContext::new(
                position,
                self.evaluator.as_ref(),
                stage,
                self.capture_rule,
                repetition,
            );
            let (score, best_move) = alpha_beta(position, 0, 0, window, -INF, INF, &mut ctx);

            result = SearchResult {
                best_move: best_move.or(fallback),
                score,
                nodes: result.nodes + ctx.nodes,
                window,
                iterations: result.iterations + 1,
            };

            let report = IterationReport {
                window,
                score,
                best_move: result.best_move,
                nodes: result.nodes,
                elapsed: control.elapsed(),
            };
            debug!(
                min_depth = window.min_depth,
                max_depth = window.max_depth,
                score,
                nodes = result.nodes,
                %stage,
                "iteration complete"
            );
            on_iter(&report);

            if result.is_mate() || window.max_depth >= self.schedule.limit {
                break;
            }
            if control.should_stop_iterating() {
                break;
            }
            window = self.schedule.widen(window);
        }

        result
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(Arc::new(Pst))
    }
}
