//! Command outcomes and non-fatal rejections.
//!
//! Commands arrive from unreliable UI sequencing, so an illegal command is
//! a value to log, never a fault.

use super::types::{InputId, PuzzleId, Stage};
use serde::{Deserialize, Serialize};

/// Commands that change the stage or session bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    /// Leave the intro.
    Start,
    /// Submit answers for a puzzle.
    SolvePuzzle,
    /// Ask for the global hint.
    RequestHint,
}

/// Why a command was ignored.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// The current stage does not permit the command.
    #[display("Cannot {} during stage {}", command, stage)]
    InvalidTransition {
        /// The rejected command.
        command: CommandKind,
        /// Stage at the time of the command.
        stage: Stage,
    },

    /// No puzzle with this id exists.
    #[display("Unknown puzzle {:?}", _0)]
    UnknownPuzzle(PuzzleId),

    /// The puzzle belongs to a level other than the active one.
    #[display("Puzzle {} is not part of stage {}", puzzle, stage)]
    NotInActiveLevel {
        /// The puzzle named by the command.
        puzzle: PuzzleId,
        /// Stage at the time of the command.
        stage: Stage,
    },

    /// The puzzle has no hint text.
    #[display("Puzzle {} has no hint", _0)]
    NoHintAvailable(PuzzleId),

    /// The puzzle is already solved, so its hint is no longer offered.
    #[display("Puzzle {} is already solved", _0)]
    AlreadySolved(PuzzleId),
}

impl std::error::Error for Rejection {}

/// Handle for one armed settle delay.
///
/// Only the most recently armed ticket can advance the stage; reset and
/// every stage change invalidate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettleTicket {
    pub(super) generation: u64,
    pub(super) stage: Stage,
}

impl SettleTicket {
    /// The stage whose completion armed this ticket.
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// Result of an accepted solve command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Some answers were missing or wrong; nothing changed.
    Incorrect {
        /// Inputs that failed, in display order.
        inputs: Vec<InputId>,
    },
    /// The puzzle was already completed; nothing changed.
    AlreadySolved,
    /// The puzzle is now completed; the level still has open puzzles.
    Solved,
    /// The puzzle completed its level; the settle delay is armed.
    LevelComplete(SettleTicket),
}

impl SolveOutcome {
    /// Returns true if the answers were accepted, now or earlier.
    pub fn is_solved(&self) -> bool {
        !matches!(self, SolveOutcome::Incorrect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        let rejection = Rejection::InvalidTransition {
            command: CommandKind::Start,
            stage: Stage::Level2,
        };
        assert_eq!(rejection.to_string(), "Cannot start during stage Level2");

        let rejection = Rejection::NotInActiveLevel {
            puzzle: "L3A".to_string(),
            stage: Stage::Level1,
        };
        assert_eq!(rejection.to_string(), "Puzzle L3A is not part of stage Level1");
    }
}
