//! Single hint invariant: the global hint is held by at most one puzzle.

use super::super::GameStateMachine;
use super::Invariant;

/// Invariant: the hint is spent iff exactly one puzzle holds it.
pub struct SingleHintInvariant;

impl Invariant<GameStateMachine> for SingleHintInvariant {
    fn holds(machine: &GameStateMachine) -> bool {
        let hints = machine.state().hints();
        let revealed = hints.revealed().len();
        revealed <= 1 && hints.is_used() == (revealed == 1)
    }

    fn description() -> &'static str {
        "The global hint is revealed for at most one puzzle"
    }
}
