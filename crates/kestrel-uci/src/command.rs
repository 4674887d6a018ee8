//! UCI command parsing.

use std::time::Duration;

use kestrel_core::Position;
use kestrel_engine::SearchParameters;

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` uses defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until next time control. Parsed but unused.
    pub movestogo: Option<u32>,
    /// Cap the depth window at this depth.
    pub depth: Option<u8>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Node limit. Parsed but unused.
    pub nodes: Option<u64>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
    /// Pondering request. Parsed but unused.
    pub ponder: bool,
}

impl GoParams {
    /// The subset of the command the session acts on.
    pub fn search_parameters(&self) -> SearchParameters {
        SearchParameters {
            wtime: self.wtime,
            btime: self.btime,
            winc: self.winc,
            binc: self.binc,
            movetime: self.movetime,
            depth: self.depth,
            infinite: self.infinite,
        }
    }
}

/// Options settable through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Seed for the session's random generator.
    RandomSeed(u64),
}

/// Board and game history from a `position` command.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    /// Position after every listed move.
    pub position: Position,
    /// Key of each position a listed move was played from, oldest first.
    pub history: Vec<u64>,
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `setoption name <id> value <x>`.
    SetOption(UciOption),
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(PositionInfo),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (ignored).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "setoption" => parse_setoption(&tokens[1..]),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse `setoption name <id> [value <x>]`.
///
/// Option names may contain spaces and match case-insensitively.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MalformedOption);
    }
    let rest = &tokens[1..];
    let value_at = rest.iter().position(|&t| t == "value");
    let (name_tokens, value_tokens) = match value_at {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, &[][..]),
    };
    let name = name_tokens.join(" ");
    let value = value_tokens.join(" ");

    if name.eq_ignore_ascii_case("randomseed") {
        let seed = value.parse().map_err(|_| UciError::InvalidOptionValue {
            name: name.clone(),
            value: value.clone(),
        })?;
        Ok(Command::SetOption(UciOption::RandomSeed(seed)))
    } else {
        Err(UciError::UnknownOption { name })
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
///
/// The move counters of a FEN may be left out.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let moves_at = tokens.iter().position(|&t| t == "moves");
    let (setup, moves) = match moves_at {
        Some(i) => (&tokens[..i], &tokens[i + 1..]),
        None => (tokens, &[][..]),
    };

    let mut position = match setup {
        ["startpos"] => Position::starting_position(),
        ["fen", fields @ ..] if !fields.is_empty() => {
            let fen = fields.join(" ");
            Position::from_fen(&fen).map_err(|_| UciError::InvalidFen { fen })?
        }
        ["fen"] => return Err(UciError::InvalidFen { fen: String::new() }),
        _ => return Err(UciError::MalformedPosition),
    };

    let mut history = Vec::with_capacity(moves.len());
    for uci_str in moves {
        let mv = position
            .parse_uci_move(uci_str)
            .map_err(|_| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
        history.push(position.key());
        position.make_move(mv);
    }

    Ok(Command::Position(PositionInfo { position, history }))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime,
/// nodes, infinite, ponder. Unknown tokens are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();
    let mut tokens = tokens.iter().copied();

    while let Some(key) = tokens.next() {
        match key {
            "infinite" => params.infinite = true,
            "ponder" => params.ponder = true,
            "wtime" => params.wtime = Some(millis(key, tokens.next())?),
            "btime" => params.btime = Some(millis(key, tokens.next())?),
            "winc" => params.winc = Some(millis(key, tokens.next())?),
            "binc" => params.binc = Some(millis(key, tokens.next())?),
            "movetime" => params.movetime = Some(millis(key, tokens.next())?),
            "movestogo" => params.movestogo = Some(number(key, tokens.next())?),
            "depth" => params.depth = Some(number(key, tokens.next())?),
            "nodes" => params.nodes = Some(number(key, tokens.next())?),
            _ => {}
        }
    }

    Ok(Command::Go(params))
}

/// Milliseconds following `key`.
///
/// GUIs occasionally send a negative clock when a player has flagged;
/// those clamp to zero.
fn millis(key: &str, value: Option<&str>) -> Result<Duration, UciError> {
    let ms: i64 = number(key, value)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

fn number<T: std::str::FromStr>(key: &str, value: Option<&str>) -> Result<T, UciError> {
    let value = value.ok_or_else(|| UciError::MissingGoValue {
        param: key.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: key.to_string(),
        value: value.to_string(),
    })
}
