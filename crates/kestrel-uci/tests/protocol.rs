//! End-to-end protocol tests: command text in, response text out.

use std::io::Cursor;

use kestrel_core::Position;
use kestrel_engine::{DepthSchedule, EmptyBook, EngineConfig, JsonBook, OpeningBook, Session};
use kestrel_uci::UciEngine;

fn config() -> EngineConfig {
    EngineConfig {
        seed: Some(5),
        repetition_table_size: 1 << 16,
        depth: DepthSchedule {
            first_min: 1,
            first_max: 2,
            min_step: 1,
            max_step: 2,
            limit: 6,
        },
        ..EngineConfig::default()
    }
}

fn run_with_book(input: &str, book: Box<dyn OpeningBook>) -> String {
    let mut out = Vec::new();
    UciEngine::new(Session::new(config(), book))
        .run_with(Cursor::new(input.to_string()), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn run(input: &str) -> String {
    run_with_book(input, Box::new(EmptyBook))
}

fn bestmove(output: &str) -> &str {
    output
        .lines()
        .find_map(|line| line.strip_prefix("bestmove "))
        .expect("a bestmove line")
}

#[test]
fn handshake() {
    let output = run("uci\nisready\nquit\n");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.first(), Some(&"id name kestrel"));
    assert!(lines.iter().any(|l| l.starts_with("option name RandomSeed type spin")));
    assert!(lines.contains(&"uciok"));
    assert_eq!(lines.last(), Some(&"readyok"));
}

#[test]
fn go_answers_with_info_and_a_legal_bestmove() {
    let output = run("position startpos moves e2e4\ngo depth 2\n");
    assert!(output.lines().any(|l| l.starts_with("info depth 2 seldepth 1 score cp ")));

    let mut position = Position::starting_position();
    position.make_move(position.parse_uci_move("e2e4").unwrap());
    assert!(position.parse_uci_move(bestmove(&output)).is_ok());
}

#[test]
fn mate_is_reported_as_mate() {
    let output = run("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1\ngo depth 4\n");
    assert_eq!(bestmove(&output), "a1a8");
    assert!(output.contains("score mate 1"));
}

#[test]
fn checkmated_side_answers_null_move() {
    let output = run("position fen R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1\ngo depth 2\n");
    assert_eq!(bestmove(&output), "0000");
}

#[test]
fn bad_position_leaves_the_board_alone() {
    let output = run("position startpos moves e2e5\nsetoption name Hash value 1\ngo depth 1\n");
    assert!(
        Position::starting_position()
            .parse_uci_move(bestmove(&output))
            .is_ok(),
        "search still runs from the starting position"
    );
}

#[test]
fn quit_during_search_still_answers() {
    let output = run("go infinite\nquit\n");
    assert_eq!(output.lines().filter(|l| l.starts_with("bestmove")).count(), 1);
}

#[test]
fn book_move_is_announced() {
    let book = JsonBook::from_json(
        r#"[{ "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
              "eval": 20, "moves": [{ "move": "d2d4", "eval": 25 }] }]"#,
    )
    .unwrap();
    let output = run_with_book("ucinewgame\nposition startpos\ngo wtime 1000 btime 1000\n", Box::new(book));
    assert!(output.contains("info string book move"));
    assert_eq!(bestmove(&output), "d2d4");
}
