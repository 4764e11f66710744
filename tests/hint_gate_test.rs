//! Tests for the single global hint.

use strictly_puzzles::{
    Answers, GameStateMachine, HintDecision, LevelCatalog, LevelConfig, PuzzleConfig,
    PuzzleInput, Rejection, SessionSettings, SolveOutcome, Stage,
};
use std::sync::Arc;

/// A catalog whose first level holds two hinted puzzles.
fn two_hint_catalog() -> LevelCatalog {
    let mut levels = LevelCatalog::builtin().levels().to_vec();
    levels[0] = LevelConfig::new(
        Stage::Level1,
        "Twin Clues",
        vec![
            PuzzleConfig::new("A", "/a.jpg", vec![PuzzleInput::new("a", ["alpha"])])
                .with_hint("first letter"),
            PuzzleConfig::new("B", "/b.jpg", vec![PuzzleInput::new("b", ["beta"])])
                .with_hint("second letter"),
        ],
    );
    LevelCatalog::new(levels).expect("Valid catalog")
}

fn started_machine() -> GameStateMachine {
    let mut machine =
        GameStateMachine::new(Arc::new(two_hint_catalog()), SessionSettings::default());
    machine.start().expect("Start from intro");
    machine
}

#[test]
fn test_first_requester_wins() {
    let mut machine = started_machine();

    assert_eq!(machine.request_hint("A"), Ok(HintDecision::Granted));
    assert_eq!(machine.request_hint("B"), Ok(HintDecision::Denied));
    assert_eq!(machine.request_hint("A"), Ok(HintDecision::AlreadyRevealed));

    assert!(machine.hint_used());
    assert!(machine.is_hint_visible_for("A"));
    assert!(!machine.is_hint_visible_for("B"));
    assert_eq!(machine.revealed_hint("A"), Some("first letter"));
    assert_eq!(machine.revealed_hint("B"), None);
}

#[test]
fn test_revealed_hint_survives_solving() {
    let mut machine = started_machine();
    machine.request_hint("B").unwrap();

    let answers = Answers::from([("b".to_string(), "BETA".to_string())]);
    machine.solve_puzzle("B", &answers).unwrap();

    assert_eq!(machine.request_hint("B"), Ok(HintDecision::AlreadyRevealed));
    assert!(machine.is_hint_visible_for("B"));
}

#[test]
fn test_reset_returns_the_hint() {
    let mut machine = started_machine();
    machine.request_hint("A").unwrap();
    machine.reset();

    assert!(!machine.hint_used());
    machine.start().unwrap();
    assert_eq!(machine.request_hint("B"), Ok(HintDecision::Granted));
}

#[test]
fn test_unhinted_puzzle_does_not_spend_hint() {
    let mut machine = GameStateMachine::with_builtin_catalog();
    machine.start().unwrap();
    let answers = Answers::from([("l1_input".to_string(), "Mäkikotka".to_string())]);
    let SolveOutcome::LevelComplete(ticket) = machine.solve_puzzle("L1", &answers).unwrap() else {
        panic!("Expected level completion");
    };
    machine.settle(ticket);

    assert!(matches!(machine.request_hint("L2B"), Err(Rejection::NoHintAvailable(_))));
    assert!(!machine.hint_used());
    assert_eq!(machine.request_hint("L2A"), Ok(HintDecision::Granted));
}
