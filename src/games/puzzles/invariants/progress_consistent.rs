//! Progress invariant: nothing is completed ahead of the current stage.

use super::super::GameStateMachine;
use super::Invariant;

/// Invariant: every completed puzzle belongs to a level at or before the
/// current stage.
///
/// Puzzles can only be solved while their level is active and stages never
/// move backwards except through reset, which clears completions.
pub struct ProgressConsistentInvariant;

impl Invariant<GameStateMachine> for ProgressConsistentInvariant {
    fn holds(machine: &GameStateMachine) -> bool {
        let current = machine.stage();
        machine.state().completed().iter().all(|id| {
            machine
                .catalog()
                .stage_of(id)
                .is_none_or(|stage| stage <= current)
        })
    }

    fn description() -> &'static str {
        "Completed puzzles never lie ahead of the current stage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::puzzles::Answers;

    #[test]
    fn test_holds_through_level_one() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        let answers = Answers::from([("l1_input".to_string(), "mäkikotka".to_string())]);
        machine.solve_puzzle("L1", &answers).unwrap();
        assert!(ProgressConsistentInvariant::holds(&machine));
    }

    #[test]
    fn test_future_puzzle_violates() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        machine.state_mut().completed.insert("L2B".to_string());
        assert!(!ProgressConsistentInvariant::holds(&machine));
    }
}
