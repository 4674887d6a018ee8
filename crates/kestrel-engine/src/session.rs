//! Game session: position, clocks and the search worker.
//!
//! All mutable game state lives behind one mutex. The command thread takes
//! it to change the position and the worker thread holds it for the whole
//! of one move choice (book lookup plus iterative deepening). Only one
//! worker exists at a time: it is joined before the next one is spawned,
//! and a `go` that arrives while a search runs is ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use kestrel_core::{ChessMove, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::book::{OpeningBook, OpeningSelector};
use crate::config::EngineConfig;
use crate::eval::{Evaluator, GameStage, Pst};
use crate::search::control::SearchControl;
use crate::search::repetition::RepetitionTable;
use crate::search::{IterationReport, Searcher};
use crate::time::{SearchParameters, move_budget};

/// Where a chosen move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Search,
}

/// Outcome of one `go`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<ChessMove>,
    pub source: MoveSource,
    /// Score for the side to move; zero for book moves.
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Notifications from the search worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Iteration(IterationReport),
    Finished(SearchReport),
}

struct SessionState {
    position: Position,
    repetition: RepetitionTable,
    book: OpeningSelector,
    rng: StdRng,
    params: SearchParameters,
    /// Seed for the next reset; entropy when `None`.
    seed: Option<u64>,
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One game against one opponent.
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    config: Arc<EngineConfig>,
    evaluator: Arc<dyn Evaluator>,
    searching: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Session {
    /// Session using the table-driven evaluator.
    pub fn new(config: EngineConfig, book: Box<dyn OpeningBook>) -> Self {
        Self::with_evaluator(config, book, Arc::new(Pst))
    }

    pub fn with_evaluator(
        config: EngineConfig,
        book: Box<dyn OpeningBook>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let state = SessionState {
            position: Position::starting_position(),
            repetition: RepetitionTable::new(config.repetition_table_size),
            book: OpeningSelector::new(book, config.random_coefficient),
            rng: seeded_rng(config.seed),
            params: SearchParameters::default(),
            seed: config.seed,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            config: Arc::new(config),
            evaluator,
            searching: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a worker is choosing a move.
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    /// Copy of the current position, or `None` while searching.
    pub fn position(&self) -> Option<Position> {
        if self.is_searching() {
            return None;
        }
        Some(self.lock().position.clone())
    }

    /// Replace the position.
    ///
    /// `history` holds the key of every position before each move played
    /// to reach `position`; the repetition table is rebuilt from it.
    /// Returns `false` and changes nothing while a search is running.
    pub fn set_position(&mut self, position: Position, history: &[u64]) -> bool {
        if self.is_searching() {
            warn!("position received while searching, ignoring");
            return false;
        }
        let mut state = self.lock();
        state.repetition.clear();
        for &key in history {
            state.repetition.increment(key);
        }
        state.position = position;
        true
    }

    /// Start choosing a move on a worker thread.
    ///
    /// `params` is merged into the stored clock state. `on_event` receives
    /// one [`SearchEvent::Iteration`] per completed deepening round and a
    /// final [`SearchEvent::Finished`]. Returns `false` when a search is
    /// already running; the request is then dropped.
    pub fn start_search<F>(&mut self, params: SearchParameters, mut on_event: F) -> bool
    where
        F: FnMut(SearchEvent) + Send + 'static,
    {
        if self.is_searching() {
            warn!("go received while searching, ignoring");
            return false;
        }
        self.join_worker();

        self.stop.store(false, Ordering::Release);
        self.searching.store(true, Ordering::Release);

        let state = Arc::clone(&self.state);
        let config = Arc::clone(&self.config);
        let evaluator = Arc::clone(&self.evaluator);
        let searching = Arc::clone(&self.searching);
        let stop = Arc::clone(&self.stop);

        let spawned = thread::Builder::new()
            .name("kestrel-search".to_string())
            .spawn(move || {
                let report = {
                    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                    choose_move(&mut guard, &config, evaluator, stop, &params, &mut on_event)
                };
                searching.store(false, Ordering::Release);
                on_event(SearchEvent::Finished(report));
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to spawn search thread");
                self.searching.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Ask the worker to stop after its current round and wait for it.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.join_worker();
    }

    /// Wait for the worker to finish on its own.
    pub fn wait(&mut self) {
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("search thread panicked");
                self.searching.store(false, Ordering::Release);
            }
        }
    }

    /// Start a new game: starting position, empty repetition table, book
    /// re-enabled, clocks forgotten and the RNG reseeded.
    pub fn reset(&mut self) {
        self.stop();
        let mut state = self.lock();
        state.position = Position::starting_position();
        state.repetition.clear();
        state.book.reset();
        state.params = SearchParameters::default();
        state.rng = seeded_rng(state.seed);
        debug!(seed = ?state.seed, "session reset");
    }

    /// Use `seed` for the RNG now and on every later reset.
    pub fn set_seed(&mut self, seed: u64) -> bool {
        if self.is_searching() {
            warn!("seed change received while searching, ignoring");
            return false;
        }
        let mut state = self.lock();
        state.seed = Some(seed);
        state.rng = StdRng::seed_from_u64(seed);
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Book first, then iterative deepening; the move is applied to the session.
fn choose_move<F>(
    state: &mut SessionState,
    config: &EngineConfig,
    evaluator: Arc<dyn Evaluator>,
    stop: Arc<AtomicBool>,
    params: &SearchParameters,
    on_event: &mut F,
) -> SearchReport
where
    F: FnMut(SearchEvent),
{
    let started = Instant::now();
    state.params.merge(params);

    let side = state.position.side_to_move();
    let root_key = state.position.key();

    let (best_move, source, score, nodes) =
        match state.book.select(&state.position, &mut state.rng) {
            Some(mv) => (Some(mv), MoveSource::Book, 0, 0),
            None => {
                let stage = GameStage::detect(&state.position, &config.stages);
                let control = match move_budget(&state.params, side, stage, &config.time) {
                    Some(budget) => {
                        SearchControl::new_timed(stop, budget, config.time.deepening_fraction)
                    }
                    None => SearchControl::new_infinite(stop),
                };
                let schedule = match state.params.depth {
                    Some(depth) => config.depth.capped(depth),
                    None => config.depth,
                };
                debug!(%stage, budget = ?control.budget(), "starting search");

                let searcher = Searcher::new(evaluator)
                    .with_schedule(schedule)
                    .with_capture_rule(config.capture_rule)
                    .with_stage_thresholds(config.stages.clone());
                let result = searcher.search(
                    &mut state.position,
                    &mut state.repetition,
                    &control,
                    |report| on_event(SearchEvent::Iteration(report.clone())),
                );
                (result.best_move, MoveSource::Search, result.score, result.nodes)
            }
        };

    if let Some(mv) = best_move {
        state.repetition.increment(root_key);
        state.position.make_move(mv);
    }

    let elapsed = started.elapsed();
    state.params.charge(side, elapsed);
    info!(
        best_move = ?best_move.map(|mv| mv.to_string()),
        ?source,
        score,
        nodes,
        elapsed_ms = elapsed.as_millis() as u64,
        "move chosen"
    );

    SearchReport {
        best_move,
        source,
        score,
        nodes,
        elapsed,
    }
}
