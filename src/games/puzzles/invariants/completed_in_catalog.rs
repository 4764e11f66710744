//! Completed puzzles invariant: only catalog puzzles can be completed.

use super::super::GameStateMachine;
use super::Invariant;

/// Invariant: every completed id names a puzzle in the catalog.
pub struct CompletedInCatalogInvariant;

impl Invariant<GameStateMachine> for CompletedInCatalogInvariant {
    fn holds(machine: &GameStateMachine) -> bool {
        machine
            .state()
            .completed()
            .iter()
            .all(|id| machine.catalog().contains_puzzle(id))
    }

    fn description() -> &'static str {
        "Completed puzzles all belong to the catalog"
    }
}
