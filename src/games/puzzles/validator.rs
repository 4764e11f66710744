//! Answer checking for puzzle inputs.
//!
//! Matching is exact after normalization: any one accepted spelling is
//! enough, and there is no partial credit.

use super::types::{Answers, InputId, PuzzleConfig, PuzzleInput};
use tracing::{debug, instrument};

/// Normalizes and compares submitted answers.
pub struct AnswerValidator;

impl AnswerValidator {
    /// Trims surrounding whitespace and lowercases.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// True iff the normalized answer is one of the input's accepted answers.
    #[instrument(skip(input), fields(input_id = input.id()))]
    pub fn is_input_correct(input: &PuzzleInput, raw: &str) -> bool {
        let answer = Self::normalize(raw);
        !answer.is_empty() && input.expected().contains(&answer)
    }

    /// True iff every input has a supplied, correct answer.
    #[instrument(skip(puzzle, answers), fields(puzzle_id = puzzle.id()))]
    pub fn is_puzzle_fully_solved(puzzle: &PuzzleConfig, answers: &Answers) -> bool {
        Self::incorrect_inputs(puzzle, answers).is_empty()
    }

    /// Ids of the inputs whose answer is missing or wrong, in display order.
    #[instrument(skip(puzzle, answers), fields(puzzle_id = puzzle.id()))]
    pub fn incorrect_inputs(puzzle: &PuzzleConfig, answers: &Answers) -> Vec<InputId> {
        let incorrect: Vec<InputId> = puzzle
            .inputs()
            .iter()
            .filter(|input| {
                answers
                    .get(input.id())
                    .is_none_or(|raw| !Self::is_input_correct(input, raw))
            })
            .map(|input| input.id().to_string())
            .collect();
        debug!(incorrect = incorrect.len(), "Checked puzzle answers");
        incorrect
    }
}
