//! Line commands typed by a player in the terminal front end.

use crate::games::puzzles::{Answers, PuzzleConfig, PuzzleId};
use derive_more::{Display, Error};
use std::str::FromStr;

/// Answers as typed: either one bare answer or `input=answer` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedAnswers {
    /// A bare answer, for single-input puzzles.
    Single(String),
    /// Answers keyed by input id.
    ById(Answers),
}

impl SubmittedAnswers {
    /// Keys the answers by input id for `puzzle`.
    ///
    /// A bare answer only fills a puzzle with exactly one input.
    pub fn into_answers(self, puzzle: &PuzzleConfig) -> Answers {
        match self {
            SubmittedAnswers::ById(answers) => answers,
            SubmittedAnswers::Single(answer) => match puzzle.inputs() {
                [only] => Answers::from([(only.id().to_string(), answer)]),
                _ => Answers::new(),
            },
        }
    }
}

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Leave the intro.
    Start,
    /// Submit answers for a puzzle.
    Solve {
        /// Target puzzle.
        puzzle: PuzzleId,
        /// Submitted answers.
        answers: SubmittedAnswers,
    },
    /// Ask for the global hint.
    Hint(PuzzleId),
    /// Replace an image.
    Override {
        /// Original asset key.
        key: String,
        /// Replacement reference.
        reference: String,
    },
    /// Report that an image failed to load.
    Missing(String),
    /// Print the session as JSON.
    Status,
    /// Start over.
    Reset,
    /// List commands.
    Help,
    /// Leave the session.
    Quit,
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  start                              begin the mission
  solve <puzzle> <answer>            answer a single-input puzzle
  solve <puzzle> <input>=<answer>... answer inputs by id
  hint <puzzle>                      spend the global hint
  override <image> <replacement>     replace an image that failed to load
  missing <image>                    report an image that failed to load
  status                             print the session as JSON
  reset                              play again from the intro
  help                               show this list
  quit                               leave";

const VERBS: &[&str] = &[
    "start", "solve", "hint", "override", "missing", "status", "reset", "help", "?", "quit", "exit",
];

/// Error parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", message)]
pub struct CommandParseError {
    /// What was wrong with the line.
    pub message: String,
}

impl CommandParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl FromStr for PlayerCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandParseError::new("Empty command"));
        };
        let rest: Vec<&str> = words.collect();

        match (verb.to_lowercase().as_str(), rest.as_slice()) {
            ("start", []) => Ok(PlayerCommand::Start),
            ("status", []) => Ok(PlayerCommand::Status),
            ("reset", []) => Ok(PlayerCommand::Reset),
            ("help" | "?", []) => Ok(PlayerCommand::Help),
            ("quit" | "exit", []) => Ok(PlayerCommand::Quit),
            ("hint", [puzzle]) => Ok(PlayerCommand::Hint(puzzle.to_string())),
            ("missing", [key]) => Ok(PlayerCommand::Missing(key.to_string())),
            ("override", [key, reference]) => Ok(PlayerCommand::Override {
                key: key.to_string(),
                reference: reference.to_string(),
            }),
            ("solve", [puzzle, answer @ ..]) if !answer.is_empty() => Ok(PlayerCommand::Solve {
                puzzle: puzzle.to_string(),
                answers: parse_answers(answer)?,
            }),
            ("solve", _) => Err(CommandParseError::new("Usage: solve <puzzle> <answer>")),
            (known, _) if VERBS.contains(&known) => Err(CommandParseError::new(format!(
                "Wrong arguments for {:?}, try help",
                verb
            ))),
            _ => Err(CommandParseError::new(format!("Unknown command {:?}, try help", verb))),
        }
    }
}

fn parse_answers(words: &[&str]) -> Result<SubmittedAnswers, CommandParseError> {
    let keyed = words.iter().filter(|word| word.contains('=')).count();
    if keyed == 0 {
        return Ok(SubmittedAnswers::Single(words.join(" ")));
    }
    if keyed != words.len() {
        return Err(CommandParseError::new(
            "Use either one bare answer or input=answer pairs",
        ));
    }

    let mut answers = Answers::new();
    for word in words {
        if let Some((input, answer)) = word.split_once('=')
            && !input.is_empty()
        {
            answers.insert(input.to_string(), answer.to_string());
        } else {
            return Err(CommandParseError::new(format!("Missing input id in {:?}", word)));
        }
    }
    Ok(SubmittedAnswers::ById(answers))
}
