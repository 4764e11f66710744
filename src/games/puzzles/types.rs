//! Core domain types for the puzzle progression.

use super::validator::AnswerValidator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Globally unique puzzle identifier.
pub type PuzzleId = String;

/// Input identifier, unique within its puzzle.
pub type InputId = String;

/// Opaque, path-like identifier of an image asset.
pub type AssetKey = String;

/// Opaque handle to a replacement image supplied by the player.
pub type ImageRef = String;

/// Raw answers submitted for a puzzle, keyed by input id.
pub type Answers = BTreeMap<InputId, String>;

/// Phase of the overall progression.
///
/// Variant order is the only legal forward order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Title screen, before the first level.
    #[default]
    Intro,
    /// First play level.
    Level1,
    /// Second play level.
    Level2,
    /// Third play level.
    Level3,
    /// Terminal stage, every level cleared.
    Finished,
}

impl Stage {
    /// The stages that carry puzzles, in order.
    pub const PLAY_STAGES: [Stage; 3] = [Stage::Level1, Stage::Level2, Stage::Level3];

    /// Position of this stage in the fixed order (Intro is 0).
    pub fn order_index(self) -> usize {
        self as usize
    }

    /// The stage that follows this one, or `None` for [`Stage::Finished`].
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Intro => Some(Stage::Level1),
            Stage::Level1 => Some(Stage::Level2),
            Stage::Level2 => Some(Stage::Level3),
            Stage::Level3 => Some(Stage::Finished),
            Stage::Finished => None,
        }
    }

    /// Returns true for the three stages that carry puzzles.
    pub fn is_play(self) -> bool {
        matches!(self, Stage::Level1 | Stage::Level2 | Stage::Level3)
    }

    /// 1-based level number for play stages.
    pub fn level_number(self) -> Option<usize> {
        self.is_play().then(|| self.order_index())
    }

    /// Whether moving from `self` to `to` is a legal single step:
    /// staying put, one step forward, or a reset to Intro.
    pub fn can_step_to(self, to: Stage) -> bool {
        to == self || to == Stage::Intro || self.next() == Some(to)
    }
}

/// Kind of value an input expects. Only a rendering hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Free text.
    #[default]
    Text,
    /// Numeric entry.
    Number,
}

/// Layout tag for a puzzle card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// The puzzle fills the level on its own.
    #[default]
    Single,
    /// The puzzle shares the level with others.
    Split,
}

/// One answer field of a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleInput {
    id: InputId,
    expected: BTreeSet<String>,
    label: Option<String>,
    placeholder: Option<String>,
    kind: InputKind,
}

impl PuzzleInput {
    /// Creates an input accepting any of `expected`.
    ///
    /// Expected answers are normalized here, once.
    pub fn new<I, S>(id: impl Into<InputId>, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            expected: expected
                .into_iter()
                .map(|answer| AnswerValidator::normalize(answer.as_ref()))
                .collect(),
            label: None,
            placeholder: None,
            kind: InputKind::default(),
        }
    }

    /// Sets the separator label shown before this input (e.g. "VS.").
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the input kind.
    pub fn with_kind(mut self, kind: InputKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the input id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the normalized accepted answers.
    pub fn expected(&self) -> &BTreeSet<String> {
        &self.expected
    }

    /// Returns the separator label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the placeholder text, if any.
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the input kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

/// One answerable challenge bound to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleConfig {
    id: PuzzleId,
    image_key: AssetKey,
    inputs: Vec<PuzzleInput>,
    hint: Option<String>,
    layout: Layout,
}

impl PuzzleConfig {
    /// Creates a puzzle without a hint, using the single layout.
    pub fn new(
        id: impl Into<PuzzleId>,
        image_key: impl Into<AssetKey>,
        inputs: Vec<PuzzleInput>,
    ) -> Self {
        Self {
            id: id.into(),
            image_key: image_key.into(),
            inputs,
            hint: None,
            layout: Layout::default(),
        }
    }

    /// Attaches hint text.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Sets the layout tag.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Returns the puzzle id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the original image asset key.
    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    /// Returns the inputs in display order.
    pub fn inputs(&self) -> &[PuzzleInput] {
        &self.inputs
    }

    /// Looks up an input by id.
    pub fn input(&self, id: &str) -> Option<&PuzzleInput> {
        self.inputs.iter().find(|input| input.id == id)
    }

    /// Returns the hint text, if this puzzle has one.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Returns the layout tag.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

/// The puzzles of one play stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelConfig {
    stage: Stage,
    title: String,
    puzzles: Vec<PuzzleConfig>,
}

impl LevelConfig {
    /// Creates a level.
    pub fn new(stage: Stage, title: impl Into<String>, puzzles: Vec<PuzzleConfig>) -> Self {
        Self {
            stage,
            title: title.into(),
            puzzles,
        }
    }

    /// Returns the stage this level belongs to.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the level title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the puzzles in display order.
    pub fn puzzles(&self) -> &[PuzzleConfig] {
        &self.puzzles
    }

    /// Iterates over the puzzle ids of this level.
    pub fn puzzle_ids(&self) -> impl Iterator<Item = &str> {
        self.puzzles.iter().map(PuzzleConfig::id)
    }

    /// Returns true if `puzzle_id` belongs to this level.
    pub fn contains(&self, puzzle_id: &str) -> bool {
        self.puzzle_ids().any(|id| id == puzzle_id)
    }
}
