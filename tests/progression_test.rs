//! End-to-end progression through the built-in catalog.

use std::time::Duration;
use strictly_puzzles::{
    Answers, GameStateMachine, PuzzleSession, Rejection, SolveOutcome, Stage,
};

const SETTLE: Duration = Duration::from_millis(1500);

fn answers(pairs: &[(&str, &str)]) -> Answers {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.to_string()))
        .collect()
}

fn new_session() -> PuzzleSession {
    PuzzleSession::new(GameStateMachine::with_builtin_catalog(), SETTLE)
}

async fn wait_for_settle() {
    tokio::time::sleep(SETTLE + Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_full_playthrough() {
    let session = new_session();

    assert_eq!(session.start().await, Ok(Stage::Level1));

    let outcome = session
        .solve_puzzle("L1", &answers(&[("l1_input", "Mäkikotka")]))
        .await
        .unwrap();
    assert!(matches!(outcome, SolveOutcome::LevelComplete(_)));
    assert!(session.read(|m| m.is_puzzle_solved("L1")).await);
    assert_eq!(session.stage().await, Stage::Level1);
    wait_for_settle().await;
    assert_eq!(session.stage().await, Stage::Level2);

    let outcome = session
        .solve_puzzle("L2A", &answers(&[("l2a_input", "pirunpelto")]))
        .await
        .unwrap();
    assert_eq!(outcome, SolveOutcome::Solved);
    wait_for_settle().await;
    assert_eq!(session.stage().await, Stage::Level2, "L2B is still open");

    session
        .solve_puzzle("L2B", &answers(&[("l2b_input", " PALLO ")]))
        .await
        .unwrap();
    wait_for_settle().await;
    assert_eq!(session.stage().await, Stage::Level3);

    session
        .solve_puzzle("L3A", &answers(&[("l3a_1", "Rocky"), ("l3a_2", "Apollo")]))
        .await
        .unwrap();
    session
        .solve_puzzle("L3B", &answers(&[("l3b_input", "Thirteen")]))
        .await
        .unwrap();
    wait_for_settle().await;
    assert_eq!(session.stage().await, Stage::Finished);

    let progress = session.read(GameStateMachine::progress).await;
    assert_eq!(progress.stage_index, 4);
    assert_eq!(progress.completed.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_solve_advances_once() {
    let session = new_session();
    session.start().await.unwrap();

    let l1 = answers(&[("l1_input", "mäkikotka")]);
    session.solve_puzzle("L1", &l1).await.unwrap();
    let again = session.solve_puzzle("L1", &l1).await.unwrap();
    assert_eq!(again, SolveOutcome::AlreadySolved);

    wait_for_settle().await;
    assert_eq!(session.stage().await, Stage::Level2);

    // A second timer would have pushed the session on to Level3.
    tokio::time::sleep(SETTLE * 3).await;
    assert_eq!(session.stage().await, Stage::Level2);
    assert_eq!(session.read(|m| m.progress().completed.len()).await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_foreign_level_solve_is_ignored() {
    let session = new_session();
    session.start().await.unwrap();

    let result = session
        .solve_puzzle("L3B", &answers(&[("l3b_input", "13")]))
        .await;
    assert!(matches!(result, Err(Rejection::NotInActiveLevel { .. })));

    tokio::time::sleep(SETTLE * 2).await;
    assert_eq!(session.stage().await, Stage::Level1);
    assert!(session.read(|m| m.progress().completed.is_empty()).await);
}

#[tokio::test(start_paused = true)]
async fn test_reset_before_settle() {
    let session = new_session();
    session.set_override("/1.jpg", "blob:uploaded").await;
    session.start().await.unwrap();
    session.request_hint("L1").await.unwrap();
    session
        .solve_puzzle("L1", &answers(&[("l1_input", "Mäkikotka")]))
        .await
        .unwrap();

    tokio::time::sleep(SETTLE / 2).await;
    session.reset().await;
    wait_for_settle().await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.stage, Stage::Intro);
    assert!(snapshot.completed.is_empty());
    assert!(!snapshot.hint_used);
    assert!(snapshot.revealed_hints.is_empty());
    assert!(!snapshot.settle_pending);
    assert_eq!(
        snapshot.image_overrides.get("/1.jpg").map(String::as_str),
        Some("blob:uploaded")
    );

    // The replay works from scratch.
    assert_eq!(session.start().await, Ok(Stage::Level1));
}

#[tokio::test(start_paused = true)]
async fn test_start_is_rejected_mid_game() {
    let session = new_session();
    session.start().await.unwrap();
    assert!(matches!(
        session.start().await,
        Err(Rejection::InvalidTransition { stage: Stage::Level1, .. })
    ));
}
