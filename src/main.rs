use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::{Context, Result};
use clap::Parser;
use kbsweeper::game::Game;
use kbsweeper::util::Board;
use kbsweeper::{Cell, KnowledgeBase};

/// Let the knowledge-based player loose on a minesweeper board
#[derive(Parser)]
#[command(name = "kbsweeper", version)]
struct Cli {
    /// ASCII board file (`*` mine, `.` clear), or `-` for stdin
    board: PathBuf,

    /// Seed for guesses; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// First cell to dig, as ROW,COL; the player guesses when omitted
    #[arg(long, value_parser = parse_cell)]
    start: Option<Cell>,
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let parse = |coord: &str| {
        coord
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("{coord:?}: {e}"))
    };
    Ok(Cell::new(parse(row)?, parse(col)?))
}

fn read_board(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut encoded = String::new();
        io::stdin()
            .read_to_string(&mut encoded)
            .context("failed to read board from stdin")?;
        Ok(encoded)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read board from {}", path.display()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let board = read_board(&cli.board)?
        .parse::<Board>()
        .context("failed to parse board")?;
    let knowledge = match cli.seed {
        Some(seed) => KnowledgeBase::with_seed(board.size(), seed)?,
        None => KnowledgeBase::new(board.size())?,
    };
    let mut game = Game::new(board, knowledge)?;
    if let Some(start) = cli.start {
        game.dig(start)?;
    }
    let outcome = game.autoplay()?;

    print!("{game}");
    println!(
        "{} after {} safe moves and {} guesses",
        if outcome.won { "Won" } else { "Lost" },
        outcome.safe_moves,
        outcome.guesses,
    );
    Ok(())
}
