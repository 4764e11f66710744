//! The immutable, ordered set of levels a session plays through.

use super::types::{InputKind, Layout, LevelConfig, PuzzleConfig, PuzzleInput, Stage};
use derive_more::{Display, Error};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Ordered levels, one per play stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Builds a catalog, validating its structure.
    ///
    /// Requires exactly one level for each play stage, in order, with
    /// globally unique puzzle ids and at least one accepted answer per input.
    #[instrument(skip(levels), fields(levels = levels.len()))]
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, CatalogError> {
        let stages: Vec<Stage> = levels.iter().map(LevelConfig::stage).collect();
        if stages != Stage::PLAY_STAGES {
            return Err(CatalogError::new(format!(
                "Levels must cover {:?} in order, found {:?}",
                Stage::PLAY_STAGES,
                stages
            )));
        }

        let mut puzzle_ids = HashSet::new();
        for level in &levels {
            if level.puzzles().is_empty() {
                return Err(CatalogError::new(format!("Level {} has no puzzles", level.stage())));
            }
            for puzzle in level.puzzles() {
                if !puzzle_ids.insert(puzzle.id()) {
                    return Err(CatalogError::new(format!("Duplicate puzzle id {:?}", puzzle.id())));
                }
                validate_inputs(puzzle)?;
            }
        }

        info!(puzzles = puzzle_ids.len(), "Catalog validated");
        Ok(Self { levels })
    }

    /// Parses and validates a catalog definition in TOML.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| CatalogError::new(format!("Failed to parse catalog: {}", e)))?;
        Self::new(file.levels.into_iter().map(LevelDef::into_level).collect())
    }

    /// Loads a catalog definition from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        debug!("Loading catalog from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CatalogError::new(format!("Failed to read catalog file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// The shipped three-level catalog.
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                LevelConfig::new(
                    Stage::Level1,
                    "The Breakfast",
                    vec![
                        PuzzleConfig::new(
                            "L1",
                            "/1.jpg",
                            vec![PuzzleInput::new("l1_input", ["Mäkikotka"])],
                        )
                        .with_hint("Janne Ahonen"),
                    ],
                ),
                LevelConfig::new(
                    Stage::Level2,
                    "Double Feature",
                    vec![
                        PuzzleConfig::new(
                            "L2A",
                            "/2a.jpg",
                            vec![PuzzleInput::new("l2a_input", ["Pirunpelto"])],
                        )
                        .with_hint("irma magna")
                        .with_layout(Layout::Split),
                        PuzzleConfig::new(
                            "L2B",
                            "/2b.jpg",
                            vec![PuzzleInput::new("l2b_input", ["Pallo"])],
                        )
                        .with_layout(Layout::Split),
                    ],
                ),
                LevelConfig::new(
                    Stage::Level3,
                    "The Final Showdown",
                    vec![
                        PuzzleConfig::new(
                            "L3A",
                            "/3a.jpg",
                            vec![
                                PuzzleInput::new("l3a_1", ["Rocky"]),
                                PuzzleInput::new("l3a_2", ["Apollo"]).with_label("VS."),
                            ],
                        )
                        .with_hint("Adrian!!!")
                        .with_layout(Layout::Split),
                        PuzzleConfig::new(
                            "L3B",
                            "/3b.jpg",
                            vec![
                                PuzzleInput::new("l3b_input", ["13", "thirteen"])
                                    .with_kind(InputKind::Number),
                            ],
                        )
                        .with_layout(Layout::Split),
                    ],
                ),
            ],
        }
    }

    /// The level played during `stage`; `None` for Intro and Finished.
    pub fn level_for(&self, stage: Stage) -> Option<&LevelConfig> {
        self.levels.iter().find(|level| level.stage() == stage)
    }

    /// Position of `stage` in the fixed order, for progress display.
    pub fn order_index_of(&self, stage: Stage) -> usize {
        stage.order_index()
    }

    /// Puzzle ids of the level for `stage`; empty for Intro and Finished.
    pub fn all_puzzle_ids_of(&self, stage: Stage) -> BTreeSet<&str> {
        self.level_for(stage)
            .map(|level| level.puzzle_ids().collect())
            .unwrap_or_default()
    }

    /// Looks up a puzzle anywhere in the catalog.
    pub fn puzzle(&self, puzzle_id: &str) -> Option<&PuzzleConfig> {
        self.levels
            .iter()
            .flat_map(LevelConfig::puzzles)
            .find(|puzzle| puzzle.id() == puzzle_id)
    }

    /// The stage whose level contains `puzzle_id`.
    pub fn stage_of(&self, puzzle_id: &str) -> Option<Stage> {
        self.levels
            .iter()
            .find(|level| level.contains(puzzle_id))
            .map(LevelConfig::stage)
    }

    /// Returns true if any level contains `puzzle_id`.
    pub fn contains_puzzle(&self, puzzle_id: &str) -> bool {
        self.stage_of(puzzle_id).is_some()
    }

    /// All levels in play order.
    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    /// Number of play levels (the denominator of "phase N / M").
    pub fn play_level_count(&self) -> usize {
        self.levels.len()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_inputs(puzzle: &PuzzleConfig) -> Result<(), CatalogError> {
    if puzzle.inputs().is_empty() {
        return Err(CatalogError::new(format!("Puzzle {:?} has no inputs", puzzle.id())));
    }
    let mut input_ids = HashSet::new();
    for input in puzzle.inputs() {
        if !input_ids.insert(input.id()) {
            return Err(CatalogError::new(format!(
                "Puzzle {:?} repeats input id {:?}",
                puzzle.id(),
                input.id()
            )));
        }
        if input.expected().is_empty() || input.expected().contains("") {
            return Err(CatalogError::new(format!(
                "Input {:?} of puzzle {:?} needs a non-empty expected answer",
                input.id(),
                puzzle.id()
            )));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
//  TOML definition
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    levels: Vec<LevelDef>,
}

#[derive(Debug, Deserialize)]
struct LevelDef {
    stage: Stage,
    title: String,
    puzzles: Vec<PuzzleDef>,
}

#[derive(Debug, Deserialize)]
struct PuzzleDef {
    id: String,
    image: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    layout: Layout,
    inputs: Vec<InputDef>,
}

#[derive(Debug, Deserialize)]
struct InputDef {
    id: String,
    expected: Expected,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    kind: InputKind,
}

/// A single accepted answer or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expected {
    One(String),
    Many(Vec<String>),
}

impl Expected {
    fn into_vec(self) -> Vec<String> {
        match self {
            Expected::One(answer) => vec![answer],
            Expected::Many(answers) => answers,
        }
    }
}

impl LevelDef {
    fn into_level(self) -> LevelConfig {
        let puzzles = self.puzzles.into_iter().map(PuzzleDef::into_puzzle).collect();
        LevelConfig::new(self.stage, self.title, puzzles)
    }
}

impl PuzzleDef {
    fn into_puzzle(self) -> PuzzleConfig {
        let inputs = self.inputs.into_iter().map(InputDef::into_input).collect();
        let puzzle = PuzzleConfig::new(self.id, self.image, inputs).with_layout(self.layout);
        match self.hint {
            Some(hint) => puzzle.with_hint(hint),
            None => puzzle,
        }
    }
}

impl InputDef {
    fn into_input(self) -> PuzzleInput {
        let mut input = PuzzleInput::new(self.id, self.expected.into_vec()).with_kind(self.kind);
        if let Some(label) = self.label {
            input = input.with_label(label);
        }
        if let Some(placeholder) = self.placeholder {
            input = input.with_placeholder(placeholder);
        }
        input
    }
}

/// Catalog construction or loading error.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog error: {} at {}:{}", message, file, line)]
pub struct CatalogError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogError {
    /// Creates a new catalog error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
