//! Event-driven UCI engine around a [`Session`].

use std::io::{self, BufRead, BufReader, Write};
use std::sync::mpsc;

use tracing::{debug, info, warn};

use kestrel_engine::{INF, IterationReport, MoveSource, SearchEvent, SearchReport, Session};

use crate::command::{Command, GoParams, PositionInfo, UciOption, parse_command};
use crate::error::UciError;

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    Search(SearchEvent),
    InputClosed,
}

/// The UCI engine.
///
/// Runs an event-driven loop on the calling thread. Input lines are read
/// on their own thread and search progress arrives from the session's
/// worker; both feed one channel, so all output is written from the loop.
pub struct UciEngine {
    session: Session,
}

impl UciEngine {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Run the UCI event loop on stdin and stdout until `quit` or input closes.
    pub fn run(self) -> Result<(), UciError> {
        self.run_with(BufReader::new(io::stdin()), io::stdout())
    }

    /// Run the event loop over arbitrary streams.
    pub fn run_with<R, W>(mut self, input: R, mut out: W) -> Result<(), UciError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let input_tx = tx.clone();
        std::thread::spawn(move || {
            for line in input.lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UCI command");
                        let cmd = parse_command(trimmed);
                        if input_tx.send(EngineEvent::UciCommand(cmd)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to read input");
                        break;
                    }
                }
            }
            let _ = input_tx.send(EngineEvent::InputClosed);
        });

        info!("kestrel ready");
        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => handle_uci(&mut out)?,
                    Command::IsReady => writeln!(out, "readyok")?,
                    Command::SetOption(opt) => self.handle_setoption(opt),
                    Command::UciNewGame => self.session.reset(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::Stop => self.session.stop(),
                    Command::Quit => break,
                    Command::Unknown(cmd) => debug!(%cmd, "ignoring unknown command"),
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::Search(event) => write_search_event(&mut out, &event)?,
                EngineEvent::InputClosed => break,
            }
            out.flush()?;
        }

        // A running search still owes its bestmove.
        self.session.stop();
        for event in rx.try_iter() {
            if let EngineEvent::Search(event) = event {
                write_search_event(&mut out, &event)?;
            }
        }
        out.flush()?;

        info!("kestrel shutting down");
        Ok(())
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::RandomSeed(seed) => {
                if self.session.set_seed(seed) {
                    debug!(seed, "random seed set");
                }
            }
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.session.set_position(info.position, &info.history);
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if params.ponder || params.nodes.is_some() || params.movestogo.is_some() {
            debug!(?params, "ponder, nodes and movestogo are not used");
        }
        let tx = tx.clone();
        self.session
            .start_search(params.search_parameters(), move |event| {
                let _ = tx.send(EngineEvent::Search(event));
            });
    }
}

fn handle_uci<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "id name kestrel")?;
    writeln!(out, "id author the kestrel developers")?;
    writeln!(
        out,
        "option name RandomSeed type spin default 0 min 0 max {}",
        i64::MAX
    )?;
    writeln!(out, "uciok")
}

fn write_search_event<W: Write>(out: &mut W, event: &SearchEvent) -> io::Result<()> {
    match event {
        SearchEvent::Iteration(report) => writeln!(out, "{}", info_line(report)),
        SearchEvent::Finished(report) => write_bestmove(out, report),
    }
}

fn write_bestmove<W: Write>(out: &mut W, report: &SearchReport) -> io::Result<()> {
    if report.source == MoveSource::Book {
        writeln!(out, "info string book move")?;
    }
    match report.best_move {
        Some(mv) => writeln!(out, "bestmove {mv}"),
        None => writeln!(out, "bestmove 0000"),
    }
}

/// `info` line for one completed deepening round.
pub fn info_line(report: &IterationReport) -> String {
    let mut line = format!(
        "info depth {} seldepth {} score {} nodes {} time {}",
        report.window.max_depth,
        report.window.min_depth,
        format_score(report.score, report.window.max_depth),
        report.nodes,
        report.elapsed.as_millis(),
    );
    if let Some(mv) = report.best_move {
        line.push_str(&format!(" pv {mv}"));
    }
    line
}

/// Centipawns, or a mate bound when the score is the mate sentinel.
///
/// The search does not track mate distance, so the mate is reported at
/// the longest distance the window allows.
pub fn format_score(score: i32, max_depth: u8) -> String {
    let moves = (i32::from(max_depth) + 1) / 2;
    if score >= INF {
        format!("mate {}", moves.max(1))
    } else if score <= -INF {
        format!("mate -{}", moves.max(1))
    } else {
        format!("cp {score}")
    }
}
