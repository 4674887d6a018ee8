//! Time management: clock parameters to a per-move budget.

use std::time::Duration;

use kestrel_core::Color;
use serde::{Deserialize, Serialize};

use crate::eval::GameStage;

/// Clock state and limits from the protocol's `go` command.
///
/// The session keeps one instance per game. Each `go` is merged into it,
/// so clock values persist between commands until replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParameters {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    /// Fixed time for this move.
    pub movetime: Option<Duration>,
    /// Cap on the depth window.
    pub depth: Option<u8>,
    /// Search until stopped.
    pub infinite: bool,
}

impl SearchParameters {
    /// Fold a newer command into the stored parameters.
    ///
    /// Supplied values replace stored ones; absent values keep theirs.
    /// `movetime`, `depth` and `infinite` only apply to the command that
    /// carries them.
    pub fn merge(&mut self, newer: &SearchParameters) {
        self.wtime = newer.wtime.or(self.wtime);
        self.btime = newer.btime.or(self.btime);
        self.winc = newer.winc.or(self.winc);
        self.binc = newer.binc.or(self.binc);
        self.movetime = newer.movetime;
        self.depth = newer.depth;
        self.infinite = newer.infinite;
    }

    /// Remaining time and increment for `side`.
    pub fn clock(&self, side: Color) -> (Option<Duration>, Option<Duration>) {
        match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        }
    }

    /// Charge `elapsed` to `side`'s clock and credit its increment.
    ///
    /// `time_left = time_left - elapsed + increment`, saturating at zero.
    pub fn charge(&mut self, side: Color, elapsed: Duration) {
        let (time, inc) = match side {
            Color::White => (&mut self.wtime, self.winc),
            Color::Black => (&mut self.btime, self.binc),
        };
        if let Some(left) = time {
            *left = left.saturating_sub(elapsed) + inc.unwrap_or(Duration::ZERO);
        }
    }
}

/// Expected moves left in the game for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    pub early_moves_left: u32,
    pub mid_moves_left: u32,
    pub end_moves_left: u32,
    /// A new deepening round starts only while elapsed time is below this
    /// fraction of the move budget.
    pub deepening_fraction: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            early_moves_left: 50,
            mid_moves_left: 40,
            end_moves_left: 20,
            deepening_fraction: 0.2,
        }
    }
}

impl TimeConfig {
    /// Moves the remaining clock is spread over in `stage`.
    pub fn expected_moves_left(&self, stage: GameStage) -> u32 {
        let moves = match stage {
            GameStage::Early => self.early_moves_left,
            GameStage::Mid => self.mid_moves_left,
            GameStage::End => self.end_moves_left,
        };
        moves.max(1)
    }
}

/// Budget for one move, or `None` when only a stop ends the search.
///
/// | Parameters            | Budget                                      |
/// |-----------------------|---------------------------------------------|
/// | `movetime`            | `movetime`                                  |
/// | `infinite`            | none                                        |
/// | clock for `side`      | `increment + time_left / moves_left(stage)` |
/// | `depth` only          | none                                        |
/// | nothing               | zero (a single round)                       |
pub fn move_budget(
    params: &SearchParameters,
    side: Color,
    stage: GameStage,
    config: &TimeConfig,
) -> Option<Duration> {
    if let Some(movetime) = params.movetime {
        return Some(movetime);
    }
    if params.infinite {
        return None;
    }

    let (time_left, increment) = params.clock(side);
    match time_left {
        Some(left) => {
            let share = left / config.expected_moves_left(stage);
            Some(increment.unwrap_or(Duration::ZERO) + share)
        }
        None if params.depth.is_some() => None,
        None => Some(Duration::ZERO),
    }
}
