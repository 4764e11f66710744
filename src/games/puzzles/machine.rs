//! Stage progression and completed-puzzle bookkeeping.
//!
//! The machine is synchronous and owns the whole session state. Deferred
//! work (the settle delay) is expressed as a [`SettleTicket`] that the host
//! redeems through [`GameStateMachine::settle`] once the delay has elapsed.

use super::action::{CommandKind, Rejection, SettleTicket, SolveOutcome};
use super::catalog::LevelCatalog;
use super::hints::{HintDecision, HintGate};
use super::invariants::{InvariantSet, SessionInvariants};
use super::overrides::ImageOverrideRegistry;
use super::types::{Answers, ImageRef, LevelConfig, PuzzleId, Stage};
use super::validator::AnswerValidator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Per-session behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Keep image overrides when the session is reset.
    pub retain_overrides_on_reset: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            retain_overrides_on_reset: true,
        }
    }
}

/// The mutable state of one play session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub(crate) stage: Stage,
    pub(crate) completed: BTreeSet<PuzzleId>,
    pub(crate) hints: HintGate,
    pub(crate) overrides: ImageOverrideRegistry,
}

impl GameState {
    /// Creates the initial state: Intro, nothing solved, hint unused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the ids of completed puzzles.
    pub fn completed(&self) -> &BTreeSet<PuzzleId> {
        &self.completed
    }

    /// Returns the hint gate.
    pub fn hints(&self) -> &HintGate {
        &self.hints
    }

    /// Returns the image override registry.
    pub fn overrides(&self) -> &ImageOverrideRegistry {
        &self.overrides
    }
}

/// Stage index plus completed puzzles, for progress display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Order index of the current stage.
    pub stage_index: usize,
    /// Ids of completed puzzles.
    pub completed: BTreeSet<PuzzleId>,
}

/// Serializable read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Current stage.
    pub stage: Stage,
    /// Order index of the current stage.
    pub stage_index: usize,
    /// Title of the active level, if any.
    pub level_title: Option<String>,
    /// Whether the global hint is spent.
    pub hint_used: bool,
    /// Ids of completed puzzles.
    pub completed: BTreeSet<PuzzleId>,
    /// Puzzles whose hint is visible.
    pub revealed_hints: BTreeSet<PuzzleId>,
    /// Stored image overrides.
    pub image_overrides: BTreeMap<String, ImageRef>,
    /// Whether a settle delay is armed.
    pub settle_pending: bool,
}

/// Finite-state machine over [`Stage`], from Intro to Finished.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    catalog: Arc<LevelCatalog>,
    settings: SessionSettings,
    state: GameState,
    pending_settle: Option<SettleTicket>,
    generation: u64,
}

impl GameStateMachine {
    /// Creates a machine at Intro over `catalog`.
    #[instrument(skip(catalog))]
    pub fn new(catalog: Arc<LevelCatalog>, settings: SessionSettings) -> Self {
        info!(levels = catalog.play_level_count(), "Creating game state machine");
        Self {
            catalog,
            settings,
            state: GameState::new(),
            pending_settle: None,
            generation: 0,
        }
    }

    /// Creates a machine over the built-in catalog with default settings.
    pub fn with_builtin_catalog() -> Self {
        Self::new(Arc::new(LevelCatalog::builtin()), SessionSettings::default())
    }

    // ─────────────────────────────────────────────────────────────
    //  Commands
    // ─────────────────────────────────────────────────────────────

    /// Intro → Level1.
    #[instrument(skip(self), fields(stage = %self.state.stage))]
    pub fn start(&mut self) -> Result<Stage, Rejection> {
        let before = self.state.stage;
        if before != Stage::Intro {
            return Err(rejected(Rejection::InvalidTransition {
                command: CommandKind::Start,
                stage: before,
            }));
        }
        self.state.stage = Stage::Level1;
        info!(stage = %self.state.stage, "Session started");
        self.verify(before);
        Ok(self.state.stage)
    }

    /// Checks `answers` for `puzzle_id` and records the completion.
    ///
    /// Only puzzles of the active level are accepted. Re-solving a completed
    /// puzzle is a no-op and never arms a second settle delay.
    #[instrument(skip(self, answers), fields(stage = %self.state.stage))]
    pub fn solve_puzzle(
        &mut self,
        puzzle_id: &str,
        answers: &Answers,
    ) -> Result<SolveOutcome, Rejection> {
        let catalog = Arc::clone(&self.catalog);
        let stage = self.state.stage;

        let Some(puzzle) = catalog.puzzle(puzzle_id) else {
            return Err(rejected(Rejection::UnknownPuzzle(puzzle_id.to_string())));
        };
        let Some(level) = catalog.level_for(stage) else {
            return Err(rejected(Rejection::InvalidTransition {
                command: CommandKind::SolvePuzzle,
                stage,
            }));
        };
        if !level.contains(puzzle_id) {
            return Err(rejected(Rejection::NotInActiveLevel {
                puzzle: puzzle_id.to_string(),
                stage,
            }));
        }
        if self.state.completed.contains(puzzle_id) {
            debug!(puzzle_id, "Puzzle already solved");
            return Ok(SolveOutcome::AlreadySolved);
        }

        let incorrect = AnswerValidator::incorrect_inputs(puzzle, answers);
        if !incorrect.is_empty() {
            debug!(puzzle_id, ?incorrect, "Incorrect answers");
            return Ok(SolveOutcome::Incorrect { inputs: incorrect });
        }

        Ok(self.mark_completed(puzzle_id))
    }

    /// Records a validated completion and arms the settle delay when the
    /// active level is now complete.
    fn mark_completed(&mut self, puzzle_id: &str) -> SolveOutcome {
        let stage = self.state.stage;
        if !self.state.completed.insert(puzzle_id.to_string()) {
            return SolveOutcome::AlreadySolved;
        }
        info!(puzzle_id, "Puzzle solved");

        let level_ids = self.catalog.all_puzzle_ids_of(stage);
        let level_complete =
            !level_ids.is_empty() && level_ids.iter().all(|id| self.state.completed.contains(*id));
        self.verify(stage);

        if !level_complete {
            return SolveOutcome::Solved;
        }
        if let Some(pending) = self.pending_settle {
            debug!(?pending, "Settle already armed");
            return SolveOutcome::Solved;
        }

        self.generation += 1;
        let ticket = SettleTicket {
            generation: self.generation,
            stage,
        };
        self.pending_settle = Some(ticket);
        info!(%stage, generation = self.generation, "Level complete, settle armed");
        SolveOutcome::LevelComplete(ticket)
    }

    /// Redeems a settle ticket once its delay has elapsed.
    ///
    /// Advances only if `ticket` is still the pending one. Returns whether
    /// the stage changed.
    #[instrument(skip(self), fields(stage = %self.state.stage))]
    pub fn settle(&mut self, ticket: SettleTicket) -> bool {
        if self.pending_settle != Some(ticket) {
            debug!(?ticket, pending = ?self.pending_settle, "Ignoring stale settle ticket");
            return false;
        }
        self.advance();
        true
    }

    /// Moves to the next stage; no-op at Finished.
    pub(crate) fn advance(&mut self) {
        let before = self.state.stage;
        self.pending_settle = None;
        match before.next() {
            Some(next) => {
                self.state.stage = next;
                info!(from = %before, to = %next, "Stage advanced");
            }
            None => debug!("Already finished"),
        }
        self.verify(before);
    }

    /// Back to Intro with nothing solved and the hint unused.
    ///
    /// Cancels any pending settle. Image overrides survive unless the
    /// session was configured otherwise.
    #[instrument(skip(self), fields(stage = %self.state.stage))]
    pub fn reset(&mut self) {
        let before = self.state.stage;
        if let Some(cancelled) = self.pending_settle.take() {
            info!(?cancelled, "Cancelled pending settle");
        }
        self.generation += 1;
        self.state.stage = Stage::Intro;
        self.state.completed.clear();
        self.state.hints = HintGate::new();
        if !self.settings.retain_overrides_on_reset {
            self.state.overrides.clear();
        }
        info!(
            overrides_kept = self.settings.retain_overrides_on_reset,
            "Session reset"
        );
        self.verify(before);
    }

    /// Asks the single global hint for `puzzle_id`.
    ///
    /// A puzzle that already holds the hint always gets `AlreadyRevealed`.
    /// Otherwise the puzzle must have hint text, belong to the active level
    /// and still be unsolved.
    #[instrument(skip(self), fields(stage = %self.state.stage))]
    pub fn request_hint(&mut self, puzzle_id: &str) -> Result<HintDecision, Rejection> {
        let catalog = Arc::clone(&self.catalog);
        let stage = self.state.stage;

        let Some(puzzle) = catalog.puzzle(puzzle_id) else {
            return Err(rejected(Rejection::UnknownPuzzle(puzzle_id.to_string())));
        };
        if puzzle.hint().is_none() {
            return Err(rejected(Rejection::NoHintAvailable(puzzle_id.to_string())));
        }
        if !self.state.hints.is_revealed(puzzle_id) {
            let Some(level) = catalog.level_for(stage) else {
                return Err(rejected(Rejection::InvalidTransition {
                    command: CommandKind::RequestHint,
                    stage,
                }));
            };
            if !level.contains(puzzle_id) {
                return Err(rejected(Rejection::NotInActiveLevel {
                    puzzle: puzzle_id.to_string(),
                    stage,
                }));
            }
            if self.state.completed.contains(puzzle_id) {
                return Err(rejected(Rejection::AlreadySolved(puzzle_id.to_string())));
            }
        }

        let decision = self.state.hints.request(puzzle_id);
        info!(puzzle_id, %decision, "Hint requested");
        self.verify(stage);
        Ok(decision)
    }

    /// Stores a replacement for an image asset; last write wins.
    #[instrument(skip(self, reference))]
    pub fn set_override(
        &mut self,
        key: &str,
        reference: impl Into<ImageRef>,
    ) -> Option<ImageRef> {
        self.state.overrides.set_override(key, reference)
    }

    /// Records that the image behind `key` failed to load.
    #[instrument(skip(self))]
    pub fn report_asset_failure(&mut self, key: &str) {
        warn!(key, "Image failed to load, override needed");
        self.state.overrides.report_load_failure(key);
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Returns the current stage.
    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// The level being played, or `None` at Intro and Finished.
    pub fn active_level(&self) -> Option<&LevelConfig> {
        self.catalog.level_for(self.state.stage)
    }

    /// Stage index plus completed puzzles.
    pub fn progress(&self) -> Progress {
        Progress {
            stage_index: self.catalog.order_index_of(self.state.stage),
            completed: self.state.completed.clone(),
        }
    }

    /// Returns true if `puzzle_id` is completed.
    pub fn is_puzzle_solved(&self, puzzle_id: &str) -> bool {
        self.state.completed.contains(puzzle_id)
    }

    /// Returns true if `puzzle_id` holds the revealed hint.
    pub fn is_hint_visible_for(&self, puzzle_id: &str) -> bool {
        self.state.hints.is_revealed(puzzle_id)
    }

    /// Hint text for `puzzle_id`, only once it is visible.
    pub fn revealed_hint(&self, puzzle_id: &str) -> Option<&str> {
        if !self.is_hint_visible_for(puzzle_id) {
            return None;
        }
        self.catalog.puzzle(puzzle_id).and_then(|puzzle| puzzle.hint())
    }

    /// Returns true once the global hint is spent.
    pub fn hint_used(&self) -> bool {
        self.state.hints.is_used()
    }

    /// The image reference to render for `key`.
    pub fn resolve_image<'a>(&'a self, key: &'a str) -> &'a str {
        self.state.overrides.resolve(key)
    }

    /// True while `key` failed to load and has no override.
    pub fn needs_override(&self, key: &str) -> bool {
        self.state.overrides.needs_override(key)
    }

    /// The armed settle ticket, if any.
    pub fn pending_settle(&self) -> Option<SettleTicket> {
        self.pending_settle
    }

    /// Returns the session state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Returns the session settings.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Serializable view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.state.stage,
            stage_index: self.state.stage.order_index(),
            level_title: self.active_level().map(|level| level.title().to_string()),
            hint_used: self.hint_used(),
            completed: self.state.completed.clone(),
            revealed_hints: self.state.hints.revealed().clone(),
            image_overrides: self
                .state
                .overrides
                .iter()
                .map(|(key, reference)| (key.to_string(), reference.to_string()))
                .collect(),
            settle_pending: self.pending_settle.is_some(),
        }
    }

    /// Checks session invariants and the stage step in debug builds.
    fn verify(&self, before: Stage) {
        if cfg!(debug_assertions) {
            if let Err(violations) = SessionInvariants::check_all(self) {
                for violation in violations {
                    error!(invariant = %violation.description, "Session invariant violated");
                }
            }
            if !before.can_step_to(self.state.stage) {
                error!(from = %before, to = %self.state.stage, "Illegal stage step");
            }
        }
    }
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::with_builtin_catalog()
    }
}

fn rejected(rejection: Rejection) -> Rejection {
    warn!(%rejection, "Command rejected");
    rejection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(input: &str, value: &str) -> Answers {
        Answers::from([(input.to_string(), value.to_string())])
    }

    fn settle_pending(machine: &mut GameStateMachine) {
        let ticket = machine.pending_settle().expect("Settle should be armed");
        assert!(machine.settle(ticket));
    }

    #[test]
    fn test_start_only_from_intro() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        assert_eq!(machine.start(), Ok(Stage::Level1));
        assert!(matches!(
            machine.start(),
            Err(Rejection::InvalidTransition {
                command: CommandKind::Start,
                stage: Stage::Level1
            })
        ));
        assert_eq!(machine.stage(), Stage::Level1);
    }

    #[test]
    fn test_solve_arms_settle_once() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();

        let outcome = machine.solve_puzzle("L1", &answer("l1_input", " mäkikotka ")).unwrap();
        assert!(matches!(
            outcome,
            SolveOutcome::LevelComplete(ticket) if ticket.stage() == Stage::Level1
        ));

        let again = machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka")).unwrap();
        assert_eq!(again, SolveOutcome::AlreadySolved);
        assert_eq!(machine.progress().completed.len(), 1);
        assert_eq!(machine.stage(), Stage::Level1);

        settle_pending(&mut machine);
        assert_eq!(machine.stage(), Stage::Level2);
        assert_eq!(machine.pending_settle(), None);
    }

    #[test]
    fn test_wrong_answer_changes_nothing() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();

        let outcome = machine.solve_puzzle("L1", &answer("l1_input", "mäkihyppy")).unwrap();
        assert_eq!(
            outcome,
            SolveOutcome::Incorrect {
                inputs: vec!["l1_input".to_string()]
            }
        );
        assert!(!machine.is_puzzle_solved("L1"));
        assert_eq!(machine.pending_settle(), None);
    }

    #[test]
    fn test_rejects_puzzle_outside_active_level() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();

        let result = machine.solve_puzzle("L2A", &answer("l2a_input", "Pirunpelto"));
        assert!(matches!(result, Err(Rejection::NotInActiveLevel { .. })));
        assert!(matches!(
            machine.solve_puzzle("nope", &Answers::new()),
            Err(Rejection::UnknownPuzzle(_))
        ));
        assert!(machine.progress().completed.is_empty());
        assert_eq!(machine.stage(), Stage::Level1);
    }

    #[test]
    fn test_solve_before_start_is_rejected() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        let result = machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka"));
        assert!(matches!(
            result,
            Err(Rejection::InvalidTransition {
                command: CommandKind::SolvePuzzle,
                stage: Stage::Intro
            })
        ));
        assert!(matches!(
            machine.request_hint("L1"),
            Err(Rejection::InvalidTransition {
                command: CommandKind::RequestHint,
                ..
            })
        ));
    }

    #[test]
    fn test_partial_level_does_not_arm() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka")).unwrap();
        settle_pending(&mut machine);

        let outcome = machine.solve_puzzle("L2A", &answer("l2a_input", "pirunpelto")).unwrap();
        assert_eq!(outcome, SolveOutcome::Solved);
        assert_eq!(machine.pending_settle(), None);
        assert_eq!(machine.stage(), Stage::Level2);
    }

    #[test]
    fn test_reset_cancels_settle_and_keeps_overrides() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.set_override("/1.jpg", "blob:one");
        machine.start().unwrap();
        machine.request_hint("L1").unwrap();
        let SolveOutcome::LevelComplete(ticket) =
            machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka")).unwrap()
        else {
            panic!("Expected level completion");
        };

        machine.reset();
        assert_eq!(machine.stage(), Stage::Intro);
        assert!(machine.progress().completed.is_empty());
        assert!(!machine.hint_used());
        assert!(!machine.is_hint_visible_for("L1"));
        assert_eq!(machine.resolve_image("/1.jpg"), "blob:one");

        assert!(!machine.settle(ticket), "Stale ticket must not advance");
        assert_eq!(machine.stage(), Stage::Intro);
    }

    #[test]
    fn test_reset_can_drop_overrides() {
        let settings = SessionSettings {
            retain_overrides_on_reset: false,
        };
        let mut machine = GameStateMachine::new(Arc::new(LevelCatalog::builtin()), settings);
        machine.set_override("/1.jpg", "blob:one");
        machine.reset();
        assert_eq!(machine.resolve_image("/1.jpg"), "/1.jpg");
    }

    #[test]
    fn test_advance_stops_at_finished() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        for _ in 0..6 {
            machine.advance();
        }
        assert_eq!(machine.stage(), Stage::Finished);
    }

    #[test]
    fn test_hint_guards() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        assert!(matches!(
            machine.request_hint("L2A"),
            Err(Rejection::NotInActiveLevel { .. })
        ));
        assert!(matches!(
            machine.request_hint("L2B"),
            Err(Rejection::NoHintAvailable(_))
        ));
        assert!(matches!(machine.request_hint("L7"), Err(Rejection::UnknownPuzzle(_))));
        assert!(!machine.hint_used());

        machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka")).unwrap();
        assert!(matches!(machine.request_hint("L1"), Err(Rejection::AlreadySolved(_))));
    }

    #[test]
    fn test_revealed_hint_stays_available() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        assert_eq!(machine.request_hint("L1"), Ok(HintDecision::Granted));
        assert_eq!(machine.revealed_hint("L1"), Some("Janne Ahonen"));

        machine.solve_puzzle("L1", &answer("l1_input", "Mäkikotka")).unwrap();
        settle_pending(&mut machine);

        // Revealed hints stay revealed after the level is left.
        assert_eq!(machine.request_hint("L1"), Ok(HintDecision::AlreadyRevealed));
        assert_eq!(machine.request_hint("L2A"), Ok(HintDecision::Denied));
        assert_eq!(machine.revealed_hint("L2A"), None);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.start().unwrap();
        machine.set_override("/1.jpg", "blob:1");
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.stage, Stage::Level1);
        assert_eq!(snapshot.stage_index, 1);
        assert_eq!(snapshot.level_title.as_deref(), Some("The Breakfast"));
        assert_eq!(snapshot.image_overrides.get("/1.jpg").map(String::as_str), Some("blob:1"));
        assert!(!snapshot.settle_pending);
    }

    #[test]
    fn test_failure_reported_after_override_keeps_image() {
        let mut machine = GameStateMachine::with_builtin_catalog();
        machine.set_override("/1.jpg", "blob:x");
        machine.report_asset_failure("/1.jpg");
        assert!(!machine.needs_override("/1.jpg"));
        assert_eq!(machine.resolve_image("/1.jpg"), "blob:x");

        machine.report_asset_failure("/2a.jpg");
        assert!(machine.needs_override("/2a.jpg"));
    }
}
