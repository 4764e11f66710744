//! Command-line interface for strictly_puzzles.

use clap::{Parser, Subcommand};

/// Strictly Puzzles - staged answer-matching puzzles in the terminal
#[derive(Parser, Debug)]
#[command(name = "strictly_puzzles")]
#[command(about = "Staged answer-matching puzzles with a single global hint", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session on stdin/stdout
    Play {
        /// Path to a game config file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Override the settle delay in milliseconds
        #[arg(long)]
        settle_delay_ms: Option<u64>,
    },

    /// Validate and print the level catalog
    Catalog {
        /// Path to a game config file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
