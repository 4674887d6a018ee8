//! Search control: stop token and move budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides whether iterative deepening may start another round.
///
/// The stop token is only consulted between rounds; a round that has
/// started always runs to completion. Two modes:
/// - **Infinite**: only the external stop token ends the search
/// - **Timed**: a new round starts only while the elapsed time is below
///   `fraction` of the move budget
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    budget: Option<Duration>,
    fraction: f64,
}

impl SearchControl {
    /// Control for `go infinite` or depth-limited searches.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            budget: None,
            fraction: 1.0,
        }
    }

    /// Control with a move budget; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, budget: Duration, fraction: f64) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            budget: Some(budget),
            fraction,
        }
    }

    /// Whether a stop has been requested.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Check whether iterative deepening should stop before the next round.
    ///
    /// Returns `true` if:
    /// - the external stop token is set, OR
    /// - a budget exists and `elapsed >= budget * fraction`
    pub fn should_stop_iterating(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        match self.budget {
            Some(budget) => self.elapsed() >= budget.mul_f64(self.fraction),
            None => false,
        }
    }

    /// Elapsed time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The move budget, if the search is timed.
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_runs_until_stopped() {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = SearchControl::new_infinite(Arc::clone(&stopped));
        assert!(!control.should_stop_iterating());
        stopped.store(true, Ordering::Release);
        assert!(control.should_stop_iterating());
    }

    #[test]
    fn zero_budget_stops_immediately() {
        let control =
            SearchControl::new_timed(Arc::new(AtomicBool::new(false)), Duration::ZERO, 0.2);
        assert!(control.should_stop_iterating());
    }

    #[test]
    fn generous_budget_keeps_going() {
        let control = SearchControl::new_timed(
            Arc::new(AtomicBool::new(false)),
            Duration::from_secs(3600),
            0.2,
        );
        assert!(!control.should_stop_iterating());
        assert_eq!(control.budget(), Some(Duration::from_secs(3600)));
    }
}
