//! Async session driver: one state machine plus its settle timer.

use crate::config::{ConfigError, GameConfig};
use crate::games::puzzles::{
    Answers, GameStateMachine, HintDecision, ImageRef, Rejection, SessionSnapshot, SettleTicket,
    SolveOutcome, Stage,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

#[derive(Debug)]
struct Inner {
    machine: GameStateMachine,
    timer: Option<JoinHandle<()>>,
}

/// A play session shared between the presentation layer and its timer.
///
/// Every command holds the session lock for its whole duration, so the
/// timer never observes a half-applied command. Clones share the session.
#[derive(Debug, Clone)]
pub struct PuzzleSession {
    inner: Arc<Mutex<Inner>>,
    settle_delay: Duration,
    stage_tx: Arc<watch::Sender<Stage>>,
}

impl PuzzleSession {
    /// Wraps `machine`, advancing `settle_delay` after each completed level.
    #[instrument(skip(machine))]
    pub fn new(machine: GameStateMachine, settle_delay: Duration) -> Self {
        info!("Creating puzzle session");
        let (stage_tx, _) = watch::channel(machine.stage());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                machine,
                timer: None,
            })),
            settle_delay,
            stage_tx: Arc::new(stage_tx),
        }
    }

    /// Builds a session from configuration, loading its catalog.
    #[instrument(skip(config))]
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let catalog = config.load_catalog()?;
        let machine = GameStateMachine::new(Arc::new(catalog), config.session_settings());
        Ok(Self::new(machine, config.settle_delay()))
    }

    /// Returns the settle delay.
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Receives the stage every time it changes.
    pub fn subscribe(&self) -> watch::Receiver<Stage> {
        self.stage_tx.subscribe()
    }

    /// Intro → Level1.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<Stage, Rejection> {
        let mut inner = self.inner.lock().await;
        let stage = inner.machine.start()?;
        self.stage_tx.send_replace(stage);
        Ok(stage)
    }

    /// Checks answers for a puzzle; arms the settle timer when the level
    /// completes.
    #[instrument(skip(self, answers))]
    pub async fn solve_puzzle(
        &self,
        puzzle_id: &str,
        answers: &Answers,
    ) -> Result<SolveOutcome, Rejection> {
        let mut inner = self.inner.lock().await;
        let outcome = inner.machine.solve_puzzle(puzzle_id, answers)?;
        if let SolveOutcome::LevelComplete(ticket) = outcome {
            self.arm(&mut inner, ticket);
        }
        Ok(outcome)
    }

    /// Asks the global hint for a puzzle.
    #[instrument(skip(self))]
    pub async fn request_hint(&self, puzzle_id: &str) -> Result<HintDecision, Rejection> {
        self.inner.lock().await.machine.request_hint(puzzle_id)
    }

    /// Stores an image replacement.
    #[instrument(skip(self, reference))]
    pub async fn set_override(
        &self,
        key: &str,
        reference: impl Into<ImageRef>,
    ) -> Option<ImageRef> {
        self.inner.lock().await.machine.set_override(key, reference)
    }

    /// Records an image load failure.
    #[instrument(skip(self))]
    pub async fn report_asset_failure(&self, key: &str) {
        self.inner.lock().await.machine.report_asset_failure(key);
    }

    /// Back to Intro; aborts a pending settle timer.
    #[instrument(skip(self))]
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(timer) = inner.timer.take() {
            debug!("Aborting settle timer");
            timer.abort();
        }
        inner.machine.reset();
        self.stage_tx.send_replace(inner.machine.stage());
    }

    /// Runs `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&GameStateMachine) -> R) -> R {
        f(&self.inner.lock().await.machine)
    }

    /// Current stage.
    pub async fn stage(&self) -> Stage {
        self.read(GameStateMachine::stage).await
    }

    /// Serializable view of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.read(GameStateMachine::snapshot).await
    }

    /// Returns true while a settle timer is waiting to fire.
    pub async fn has_pending_timer(&self) -> bool {
        self.inner
            .lock()
            .await
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn arm(&self, inner: &mut Inner, ticket: SettleTicket) {
        if let Some(stale) = inner.timer.take() {
            stale.abort();
        }

        let shared = Arc::clone(&self.inner);
        let stage_tx = Arc::clone(&self.stage_tx);
        let delay = self.settle_delay;
        debug!(?delay, ?ticket, "Arming settle timer");

        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = shared.lock().await;
            inner.timer = None;
            if inner.machine.settle(ticket) {
                stage_tx.send_replace(inner.machine.stage());
            }
        }));
    }
}
