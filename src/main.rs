//! Strictly Puzzles - Unified CLI
//!
//! Plays a puzzle session in the terminal or inspects the level catalog.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use strictly_puzzles::{GameConfig, GameStateMachine, PuzzleSession};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            settle_delay_ms,
        } => run_play(config, settle_delay_ms).await,
        Command::Catalog { config } => run_catalog(config),
    }
}

#[instrument]
fn load_config(path: Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(GameConfig::new()),
    }
}

/// Play a session on stdin/stdout
async fn run_play(config: Option<PathBuf>, settle_delay_ms: Option<u64>) -> Result<()> {
    let config = load_config(config)?;
    let catalog = config.load_catalog()?;
    let settle_delay = settle_delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.settle_delay());

    let machine = GameStateMachine::new(Arc::new(catalog), config.session_settings());
    let session = PuzzleSession::new(machine, settle_delay);
    info!(?settle_delay, "Starting terminal session");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    strictly_puzzles::run(&session, stdin, tokio::io::stdout()).await?;
    Ok(())
}

/// Validate and print the level catalog
fn run_catalog(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let catalog = config.load_catalog()?;
    info!(levels = catalog.play_level_count(), "Catalog is valid");

    for level in catalog.levels() {
        println!("{} - {}", level.stage(), level.title());
        for puzzle in level.puzzles() {
            let hint = if puzzle.hint().is_some() { " (hint)" } else { "" };
            println!("  {} [{}]{}", puzzle.id(), puzzle.image_key(), hint);
            for input in puzzle.inputs() {
                let expected: Vec<&str> = input.expected().iter().map(String::as_str).collect();
                println!("    {} = {}", input.id(), expected.join(" | "));
            }
        }
    }
    Ok(())
}
