//! Integration tests for the session controller and its worker thread.

use std::sync::mpsc;
use std::time::Duration;

use kestrel_core::{Color, Position};
use kestrel_engine::{
    DepthSchedule, EmptyBook, EngineConfig, IterationReport, JsonBook, MoveSource, SearchEvent,
    SearchParameters, SearchReport, Session,
};

const BARE_KINGS: &str = "8/8/4k3/8/8/4K3/8/8 w - - 0 1";

const OPENING_BOOK: &str = r#"[
    { "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
      "eval": 20,
      "moves": [{ "move": "e2e4", "eval": 30 }, { "move": "d2d4", "eval": 28 }] }
]"#;

fn small_config(seed: u64) -> EngineConfig {
    EngineConfig {
        seed: Some(seed),
        repetition_table_size: 1 << 16,
        depth: DepthSchedule {
            first_min: 1,
            first_max: 2,
            min_step: 1,
            max_step: 2,
            limit: 10,
        },
        ..EngineConfig::default()
    }
}

fn depth(limit: u8) -> SearchParameters {
    SearchParameters {
        depth: Some(limit),
        ..SearchParameters::default()
    }
}

fn infinite() -> SearchParameters {
    SearchParameters {
        infinite: true,
        ..SearchParameters::default()
    }
}

/// Start a search and collect its events until the final report.
fn go(session: &mut Session, params: SearchParameters) -> (SearchReport, Vec<IterationReport>) {
    let (tx, rx) = mpsc::channel();
    assert!(
        session.start_search(params, move |event| {
            let _ = tx.send(event);
        }),
        "session should accept go while idle"
    );
    collect(&rx)
}

fn collect(rx: &mpsc::Receiver<SearchEvent>) -> (SearchReport, Vec<IterationReport>) {
    let mut iterations = Vec::new();
    while let Ok(event) = rx.recv_timeout(Duration::from_secs(60)) {
        match event {
            SearchEvent::Iteration(report) => iterations.push(report),
            SearchEvent::Finished(report) => return (report, iterations),
        }
    }
    panic!("search ended without a final report");
}

#[test]
fn go_reports_and_applies_the_move() {
    let mut session = Session::new(small_config(1), Box::new(EmptyBook));
    assert!(session.set_position(BARE_KINGS.parse().unwrap(), &[]));

    let (report, iterations) = go(&mut session, depth(2));
    assert_eq!(report.source, MoveSource::Search);
    assert_eq!(iterations.len(), 1, "depth 2 caps the schedule at one round");
    let best = report.best_move.expect("bare kings still have moves");

    session.wait();
    let position = session.position().unwrap();
    assert_eq!(position.side_to_move(), Color::Black, "the move is played on the session board");
    let mut expected: Position = BARE_KINGS.parse().unwrap();
    expected.make_move(best);
    assert_eq!(position, expected);
}

#[test]
fn go_while_searching_is_ignored() {
    let mut config = small_config(1);
    config.depth.limit = 64;
    let mut session = Session::new(config, Box::new(EmptyBook));
    session.set_position(BARE_KINGS.parse().unwrap(), &[]);

    let (tx, rx) = mpsc::channel();
    assert!(session.start_search(infinite(), move |event| {
        let _ = tx.send(event);
    }));
    assert!(session.is_searching());
    assert!(!session.start_search(depth(1), |_| {}), "second go must be dropped");
    assert!(
        !session.set_position(Position::starting_position(), &[]),
        "position must not change under a running search"
    );

    session.stop();
    let (report, iterations) = collect(&rx);
    assert!(!iterations.is_empty(), "the first round always completes");
    assert!(report.best_move.is_some());
    assert!(!session.is_searching());
}

#[test]
fn history_rebuilds_repetition_table() {
    let mut session = Session::new(small_config(1), Box::new(EmptyBook));
    let position: Position = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
    let key = position.key();
    session.set_position(position, &[key, 0xABCD, key]);

    let (report, _) = go(&mut session, depth(2));
    assert_eq!(report.score, 0, "third occurrence is a draw");
    assert!(report.best_move.is_some());

    session.set_position("4k3/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap(), &[]);
    let (report, _) = go(&mut session, depth(2));
    assert!(report.score > 500, "without history the extra queen counts");
}

#[test]
fn book_then_search_then_reset() {
    let book = JsonBook::from_json(OPENING_BOOK).unwrap();
    let mut session = Session::new(small_config(9), Box::new(book));

    let (report, iterations) = go(&mut session, depth(2));
    assert_eq!(report.source, MoveSource::Book);
    assert!(iterations.is_empty(), "book moves skip the search");
    let first = report.best_move.unwrap().to_string();
    assert!(first == "e2e4" || first == "d2d4");

    // The position after black's reply is not in the book.
    let mut position = session.position().unwrap();
    position.make_move(position.parse_uci_move("e7e5").unwrap());
    session.set_position(position, &[]);
    let (report, _) = go(&mut session, depth(2));
    assert_eq!(report.source, MoveSource::Search);

    // Still out of book, even from the starting position.
    session.set_position(Position::starting_position(), &[]);
    let (report, _) = go(&mut session, depth(2));
    assert_eq!(report.source, MoveSource::Search);

    session.reset();
    assert_eq!(session.position().unwrap(), Position::starting_position());
    let (report, _) = go(&mut session, depth(2));
    assert_eq!(report.source, MoveSource::Book, "reset re-enables the book");
}

fn book_choices(seed: u64, games: usize) -> Vec<String> {
    let book = JsonBook::from_json(OPENING_BOOK).unwrap();
    let mut config = small_config(seed);
    config.random_coefficient = 1.9;
    let mut session = Session::new(config, Box::new(book));

    let mut choices = Vec::new();
    for _ in 0..games {
        let (report, _) = go(&mut session, depth(1));
        choices.push(report.best_move.unwrap().to_string());
        session.set_seed(seed.wrapping_add(choices.len() as u64));
        session.reset();
    }
    choices
}

#[test]
fn same_seed_same_book_choices() {
    let first = book_choices(2024, 12);
    let second = book_choices(2024, 12);
    assert_eq!(first, second);
}

#[test]
fn reset_reseeds_the_generator() {
    let book = JsonBook::from_json(OPENING_BOOK).unwrap();
    let mut config = small_config(77);
    config.random_coefficient = 1.9;
    let mut session = Session::new(config, Box::new(book));

    let mut moves = Vec::new();
    for _ in 0..6 {
        let (report, _) = go(&mut session, depth(1));
        moves.push(report.best_move.unwrap());
        session.reset();
    }
    assert!(
        moves.windows(2).all(|pair| pair[0] == pair[1]),
        "the same seed after every reset must replay the same choice"
    );
}

#[test]
fn clock_is_used_for_the_budget() {
    let mut session = Session::new(small_config(3), Box::new(EmptyBook));
    session.set_position(BARE_KINGS.parse().unwrap(), &[]);
    let params = SearchParameters {
        wtime: Some(Duration::from_millis(50)),
        btime: Some(Duration::from_millis(50)),
        ..SearchParameters::default()
    };
    let (report, iterations) = go(&mut session, params);
    assert!(report.best_move.is_some());
    assert!(!iterations.is_empty());
}
