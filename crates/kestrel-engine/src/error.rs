//! Error types for configuration and opening book loading.

use std::path::PathBuf;

/// Errors produced while loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for the expected schema.
    #[error("malformed config: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        reason: String,
    },
}

/// Errors produced by an [`OpeningBook`](crate::book::OpeningBook).
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// The book file could not be read.
    #[error("cannot read opening book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The book is not valid JSON for the expected schema.
    #[error("malformed opening book: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// A book entry names a position that cannot be parsed.
    #[error("opening book entry {index}: {source}")]
    InvalidEntry {
        /// Zero-based index of the entry in the book.
        index: usize,
        #[source]
        source: kestrel_core::PositionError,
    },

    /// The backing store failed during a lookup.
    #[error("opening book unavailable: {reason}")]
    Unavailable { reason: String },
}
