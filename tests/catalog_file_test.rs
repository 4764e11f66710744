//! Tests for loading catalogs and configs from disk.

use std::io::Write;
use strictly_puzzles::{GameConfig, PuzzleSession, Stage};
use tempfile::TempDir;

const CATALOG: &str = r#"
[[levels]]
stage = "level1"
title = "Warm Up"

[[levels.puzzles]]
id = "W1"
image = "/w1.jpg"
hint = "count the reindeer"

[[levels.puzzles.inputs]]
id = "count"
expected = ["9", "nine"]
kind = "number"

[[levels]]
stage = "level2"
title = "Middle"

[[levels.puzzles]]
id = "M1"
image = "/m1.jpg"

[[levels.puzzles.inputs]]
id = "word"
expected = "sleigh"

[[levels]]
stage = "level3"
title = "Last"

[[levels.puzzles]]
id = "F1"
image = "/f1.jpg"

[[levels.puzzles.inputs]]
id = "word"
expected = "star"
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create file");
    file.write_all(content.as_bytes()).expect("Failed to write file");
    path
}

#[tokio::test(start_paused = true)]
async fn test_session_from_config_with_catalog() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_file(&dir, "levels.toml", CATALOG);
    let config_path = write_file(
        &dir,
        "game.toml",
        "settle_delay_ms = 10\ncatalog = \"levels.toml\"\n",
    );

    let config = GameConfig::from_file(&config_path).expect("Valid config");
    let session = PuzzleSession::from_config(&config).expect("Valid session");
    assert_eq!(session.settle_delay(), std::time::Duration::from_millis(10));

    session.start().await.unwrap();
    let title = session
        .read(|m| m.active_level().map(|level| level.title().to_string()))
        .await;
    assert_eq!(title.as_deref(), Some("Warm Up"));

    let answers: strictly_puzzles::Answers = [("count".to_string(), "Nine".to_string())].into();
    session.solve_puzzle("W1", &answers).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(11)).await;
    assert_eq!(session.stage().await, Stage::Level2);
}

#[test]
fn test_invalid_catalog_fails_session() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_file(
        &dir,
        "levels.toml",
        "[[levels]]\nstage = \"level2\"\ntitle = \"x\"\npuzzles = []\n",
    );
    let config_path = write_file(&dir, "game.toml", "catalog = \"levels.toml\"\n");

    let config = GameConfig::from_file(&config_path).expect("Valid config");
    let err = PuzzleSession::from_config(&config).unwrap_err();
    assert!(err.message.contains("Failed to load catalog"));
}
