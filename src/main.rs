use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kestrel_engine::{EmptyBook, EngineConfig, JsonBook, OpeningBook, Session};
use kestrel_uci::UciEngine;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Alpha-beta chess engine speaking UCI", long_about = None)]
struct Args {
    /// Engine configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Opening book (JSON); overrides the configured path
    #[arg(short, long)]
    book: Option<PathBuf>,

    /// Seed for the book move sampler
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("kestrel starting");

    let mut config = EngineConfig::load_or_default(args.config.as_deref());
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let book_path = args.book.or_else(|| config.book_path.clone());
    let book: Box<dyn OpeningBook> = match book_path {
        Some(path) => match JsonBook::open(&path) {
            Ok(book) => {
                info!(path = %path.display(), positions = book.len(), "opening book loaded");
                Box::new(book)
            }
            Err(err) => {
                warn!(error = %err, "opening book unavailable, searching from move one");
                Box::new(EmptyBook)
            }
        },
        None => Box::new(EmptyBook),
    };

    UciEngine::new(Session::new(config, book)).run()?;
    Ok(())
}
