//! Session lifecycle and the concurrency boundary.
//!
//! A session owns the acquired terminal/audio surface and the cancel flag.
//! `run` moves the cycle engine onto a background thread, which becomes the
//! only writer of the display and the cue player, while the calling thread
//! blocks on input. Any key raises the cancel flag; the engine notices it
//! within one tick. The surface is released exactly once, whichever way the
//! session ends (including a panic unwinding through the owner).
//!
//! State machine: `Idle -> Running -> (Completed | Cancelled) -> Closed`.

use crate::engine::{CycleEngine, EngineOutcome};
use crate::sinks::{CancelFlag, CuePlayer, ProgressSink, StatusSink, Ticker};
use crate::types::{BreathCycle, TICK};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Exclusive resources held for the length of a session
///
/// Acquisition happens when the surface is constructed; `release` is
/// called exactly once by the owning session.
pub trait Surface {
    fn release(&mut self);
}

/// Foreground source of the "any key" cancellation event
pub trait KeySource {
    /// Wait up to `timeout` for a key press; `Ok(true)` if one arrived
    fn wait_for_key(&mut self, timeout: Duration) -> Result<bool>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Closed,
}

/// Summary of a finished run
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub id: Uuid,
    pub outcome: EngineOutcome,
    /// Cycles started before the run ended
    pub cycles_started: usize,
    pub total_cycles: usize,
    pub planned_duration: Duration,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionReport {
    /// Wall-clock time the run took
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

pub struct Session<S: Surface> {
    id: Uuid,
    title: String,
    cycles: Arc<[BreathCycle]>,
    state: SessionState,
    cancel: CancelFlag,
    surface: Option<S>,
    exit_on_complete: bool,
}

impl<S: Surface> Session<S> {
    /// Take ownership of an acquired surface
    pub fn init(title: impl Into<String>, cycles: Vec<BreathCycle>, surface: S) -> Self {
        let id = Uuid::new_v4();
        let title = title.into();
        tracing::info!(
            "Session {} initialized: '{}' ({} cycles)",
            id,
            title,
            cycles.len()
        );
        Self {
            id,
            title,
            cycles: cycles.into(),
            state: SessionState::Idle,
            cancel: CancelFlag::new(),
            surface: Some(surface),
            exit_on_complete: false,
        }
    }

    /// End the run as soon as the last cycle finishes instead of waiting
    /// for a key
    pub fn with_exit_on_complete(mut self, exit_on_complete: bool) -> Self {
        self.exit_on_complete = exit_on_complete;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle to the session's cancel flag
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run the engine in the background and wait for a key in the foreground
    ///
    /// The surface is released before this returns, on every path.
    pub fn run<D, A, T, K>(
        &mut self,
        display: D,
        audio: A,
        ticker: T,
        keys: &mut K,
    ) -> Result<SessionReport>
    where
        D: ProgressSink + StatusSink + Send + 'static,
        A: CuePlayer + Send + 'static,
        T: Ticker + Send + 'static,
        K: KeySource,
    {
        if self.state != SessionState::Idle {
            return Err(Error::Other(format!(
                "session {} cannot run from state {:?}",
                self.id, self.state
            )));
        }

        let result = self.run_inner(display, audio, ticker, keys);
        self.close();
        result
    }

    fn run_inner<D, A, T, K>(
        &mut self,
        mut display: D,
        mut audio: A,
        mut ticker: T,
        keys: &mut K,
    ) -> Result<SessionReport>
    where
        D: ProgressSink + StatusSink + Send + 'static,
        A: CuePlayer + Send + 'static,
        T: Ticker + Send + 'static,
        K: KeySource,
    {
        let span = tracing::info_span!("session", id = %self.id);
        let _guard = span.enter();

        let mut engine = CycleEngine::new(self.title.clone(), Arc::clone(&self.cycles));
        let planned_duration = engine.total_duration();
        let total_cycles = engine.cycle_count();
        let started_at = Utc::now();

        let cancel = self.cancel.clone();
        let engine_span = span.clone();
        // Set only when the engine returns; a panicked thread leaves it false
        let returned = Arc::new(AtomicBool::new(false));
        let engine_returned = Arc::clone(&returned);
        let handle = std::thread::Builder::new()
            .name("breath-engine".into())
            .spawn(move || {
                let _guard = engine_span.enter();
                let outcome = engine.run(&mut display, &mut audio, &mut ticker, &cancel);
                engine_returned.store(true, Ordering::Release);
                (outcome, engine.current_cycle())
            })?;
        self.state = SessionState::Running;
        tracing::info!("Session running");

        let waited = loop {
            match keys.wait_for_key(TICK) {
                Ok(true) => {
                    tracing::info!("Key pressed, cancelling");
                    self.cancel.cancel();
                    break Ok(());
                }
                Ok(false) => {
                    if handle.is_finished() {
                        if !returned.load(Ordering::Acquire) {
                            tracing::error!("Engine thread stopped abnormally");
                            break Ok(());
                        }
                        if self.exit_on_complete {
                            break Ok(());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Input failed, cancelling: {}", e);
                    self.cancel.cancel();
                    break Err(e);
                }
            }
        };

        let joined = handle.join();
        let finished_at = Utc::now();
        let (outcome, cycles_started) =
            joined.map_err(|_| Error::Engine("engine thread panicked".into()))?;
        waited?;

        self.state = match outcome {
            EngineOutcome::Completed => SessionState::Completed,
            EngineOutcome::Cancelled => SessionState::Cancelled,
        };
        tracing::info!(
            "Session {:?} after {} of {} cycles",
            self.state,
            cycles_started,
            total_cycles
        );

        Ok(SessionReport {
            id: self.id,
            outcome,
            cycles_started,
            total_cycles,
            planned_duration,
            started_at,
            finished_at,
        })
    }

    /// Release the surface; later calls do nothing
    pub fn close(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            self.cancel.cancel();
            surface.release();
            self.state = SessionState::Closed;
            tracing::info!("Session {} closed", self.id);
        }
    }
}

impl<S: Surface> Drop for Session<S> {
    fn drop(&mut self) {
        self.close();
    }
}
