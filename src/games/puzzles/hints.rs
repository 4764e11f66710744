//! The single global hint shared by every puzzle in a session.

use super::types::PuzzleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Result of asking the gate for a puzzle's hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum HintDecision {
    /// The hint was unused and now belongs to this puzzle.
    Granted,
    /// Another puzzle already consumed the hint.
    Denied,
    /// This puzzle already holds the hint.
    AlreadyRevealed,
}

/// First requester wins; the hint is spent until reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HintGate {
    used: bool,
    revealed: BTreeSet<PuzzleId>,
}

impl HintGate {
    /// Creates an unused gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the hint for `puzzle_id`.
    #[instrument(skip(self), fields(used = self.used))]
    pub fn request(&mut self, puzzle_id: &str) -> HintDecision {
        if self.revealed.contains(puzzle_id) {
            debug!("Hint already revealed for this puzzle");
            return HintDecision::AlreadyRevealed;
        }
        if self.used {
            debug!("Global hint already spent");
            return HintDecision::Denied;
        }
        self.used = true;
        self.revealed.insert(puzzle_id.to_string());
        info!("Global hint granted");
        HintDecision::Granted
    }

    /// Returns true once the hint has been spent.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Returns true if `puzzle_id` holds the hint.
    pub fn is_revealed(&self, puzzle_id: &str) -> bool {
        self.revealed.contains(puzzle_id)
    }

    /// Puzzles whose hint is visible.
    pub fn revealed(&self) -> &BTreeSet<PuzzleId> {
        &self.revealed
    }
}
