mod action;
mod catalog;
mod hints;
pub mod invariants;
mod machine;
mod overrides;
mod types;
mod validator;

pub use action::{CommandKind, Rejection, SettleTicket, SolveOutcome};
pub use catalog::{CatalogError, LevelCatalog};
pub use hints::{HintDecision, HintGate};
pub use machine::{GameState, GameStateMachine, Progress, SessionSettings, SessionSnapshot};
pub use overrides::ImageOverrideRegistry;
pub use types::{
    Answers, AssetKey, ImageRef, InputId, InputKind, Layout, LevelConfig, PuzzleConfig, PuzzleId,
    PuzzleInput, Stage,
};
pub use validator::AnswerValidator;
