//! Search, evaluation and session control for kestrel.

pub mod book;
pub mod config;
pub mod error;
pub mod eval;
pub mod search;
pub mod session;
pub mod time;

pub use book::{EmptyBook, JsonBook, OpeningBook, OpeningSelector};
pub use config::EngineConfig;
pub use error::{BookError, ConfigError};
pub use eval::{EvalState, Evaluator, GameStage, Material, Pst};
pub use search::control::SearchControl;
pub use search::negamax::INF;
pub use search::repetition::RepetitionTable;
pub use search::{DepthSchedule, IterationReport, SearchResult, SearchWindow, Searcher};
pub use session::{MoveSource, SearchEvent, SearchReport, Session};
pub use time::{SearchParameters, TimeConfig, move_budget};
