//! Strictly Puzzles library - a staged answer-matching puzzle game
//!
//! The core is a synchronous game-state engine; everything else is a thin
//! layer that renders its state and forwards player commands.
//!
//! # Architecture
//!
//! - **Catalog**: immutable levels, puzzles and accepted answers
//! - **Validator**: normalized answer matching
//! - **Hint gate**: one global hint per session, first requester wins
//! - **Overrides**: replacement references for images that fail to load
//! - **State machine**: stage progression from Intro to Finished
//! - **Session**: async driver owning the settle timer
//!
//! # Example
//!
//! ```no_run
//! use strictly_puzzles::{Answers, GameConfig, PuzzleSession};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = PuzzleSession::from_config(&GameConfig::new())?;
//! session.start().await?;
//!
//! let answers = Answers::from([("l1_input".to_string(), "Mäkikotka".to_string())]);
//! session.solve_puzzle("L1", &answers).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod command;
mod config;
mod games;
mod session;
mod terminal;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Session driver
pub use session::PuzzleSession;

// Crate-level exports - Terminal front end
pub use command::{CommandParseError, HELP, PlayerCommand, SubmittedAnswers};
pub use terminal::{render_puzzle, render_stage, run};

// Crate-level exports - Game engine
pub use games::puzzles::invariants;
pub use games::puzzles::{
    AnswerValidator, Answers, AssetKey, CatalogError, CommandKind, GameState, GameStateMachine,
    HintDecision, HintGate, ImageOverrideRegistry, ImageRef, InputId, InputKind, Layout,
    LevelCatalog, LevelConfig, Progress, PuzzleConfig, PuzzleId, PuzzleInput, Rejection,
    SessionSettings, SessionSnapshot, SettleTicket, SolveOutcome, Stage,
};
