//! UCI protocol errors.

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move in the `position` command is not legal where it is played.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move string that failed to parse.
        uci_move: String,
    },

    /// A `go` parameter was given without its value.
    #[error("missing value for go parameter {param}")]
    MissingGoValue { param: String },

    /// A `go` parameter value is not a number.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue { param: String, value: String },

    /// `setoption` without the `name` keyword.
    #[error("malformed setoption command: missing name keyword")]
    MalformedOption,

    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue { name: String, value: String },

    /// An I/O error occurred on the protocol streams.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::UciError;

    #[test]
    fn go_value_display() {
        let err = UciError::InvalidGoValue {
            param: "depth".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for go parameter depth: abc");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: UciError = io.into();
        assert!(matches!(err, UciError::Io { .. }));
    }
}
