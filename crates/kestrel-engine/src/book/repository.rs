//! Opening repository backends.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use kestrel_core::Position;
use serde::{Deserialize, Serialize};

use crate::error::BookError;

/// A scored candidate move in coordinate notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMove {
    #[serde(rename = "move")]
    pub uci: String,
    pub eval: i32,
}

/// What the repository knows about one position.
///
/// A node with candidate moves is a branch; a node with only a principal
/// variation is a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningNode {
    /// Static evaluation of the position.
    pub eval: i32,
    pub moves: Vec<BookMove>,
    /// Best line from this position, side to move first.
    pub pv: Vec<String>,
}

impl OpeningNode {
    pub fn is_branch(&self) -> bool {
        !self.moves.is_empty()
    }
}

/// Read-only opening repository queried by position key.
pub trait OpeningBook: Send {
    /// Look up `key`. Errors are treated like misses by the caller.
    fn lookup(&self, key: u64) -> Result<Option<OpeningNode>, BookError>;
}

/// A repository that never hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBook;

impl OpeningBook for EmptyBook {
    fn lookup(&self, _key: u64) -> Result<Option<OpeningNode>, BookError> {
        Ok(None)
    }
}

/// On-disk entry: the position as FEN plus its node.
#[derive(Debug, Deserialize)]
struct BookEntry {
    fen: String,
    #[serde(flatten)]
    node: OpeningNode,
}

/// In-memory repository loaded from a JSON array of entries:
///
/// ```json
/// [
///   { "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
///     "eval": 20,
///     "moves": [{ "move": "e2e4", "eval": 30 }, { "move": "d2d4", "eval": 25 }] },
///   { "fen": "...", "eval": 15, "pv": ["g1f3", "b8c6", "f1b5"] }
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonBook {
    nodes: HashMap<u64, OpeningNode>,
}

impl JsonBook {
    /// Parse a book from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        let entries: Vec<BookEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Parse a book from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BookError> {
        let entries: Vec<BookEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    /// Load the book file at `path`.
    pub fn open(path: &Path) -> Result<Self, BookError> {
        let file = File::open(path).map_err(|source| BookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_entries(entries: Vec<BookEntry>) -> Result<Self, BookError> {
        let mut book = Self::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let position = Position::from_fen(&entry.fen)
                .map_err(|source| BookError::InvalidEntry { index, source })?;
            book.insert(&position, entry.node);
        }
        Ok(book)
    }

    /// Add or replace the node for `position`.
    pub fn insert(&mut self, position: &Position, node: OpeningNode) {
        self.nodes.insert(position.key(), node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl OpeningBook for JsonBook {
    fn lookup(&self, key: u64) -> Result<Option<OpeningNode>, BookError> {
        Ok(self.nodes.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"[
        { "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
          "eval": 20,
          "moves": [{ "move": "e2e4", "eval": 30 }, { "move": "d2d4", "eval": 25 }] },
        { "fen": "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
          "eval": 30,
          "pv": ["c7c5", "g1f3"] }
    ]"#;

    #[test]
    fn loads_branches_and_leaves() {
        let book = JsonBook::from_json(BOOK).unwrap();
        assert_eq!(book.len(), 2);

        let start = Position::starting_position();
        let node = book.lookup(start.key()).unwrap().unwrap();
        assert!(node.is_branch());
        assert_eq!(node.moves[0], BookMove { uci: "e2e4".to_string(), eval: 30 });

        let mut after = start.clone();
        after.make_move(after.parse_uci_move("e2e4").unwrap());
        let leaf = book.lookup(after.key()).unwrap().unwrap();
        assert!(!leaf.is_branch());
        assert_eq!(leaf.pv, vec!["c7c5", "g1f3"]);
    }

    #[test]
    fn unknown_position_misses() {
        let book = JsonBook::from_json(BOOK).unwrap();
        let position: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(book.lookup(position.key()).unwrap(), None);
        assert_eq!(EmptyBook.lookup(position.key()).unwrap(), None);
    }

    #[test]
    fn bad_fen_reports_entry_index() {
        let json = r#"[{ "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1" },
                       { "fen": "garbage" }]"#;
        let err = JsonBook::from_json(json).unwrap_err();
        assert!(matches!(err, BookError::InvalidEntry { index: 1, .. }), "got {err:?}");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = JsonBook::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BookError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JsonBook::open(Path::new("/nonexistent/book.json")).unwrap_err();
        assert!(matches!(err, BookError::Io { .. }));
    }
}
