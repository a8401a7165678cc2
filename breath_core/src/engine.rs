//! Cycle execution engine.
//!
//! Runs every cycle's phases in order (inhale, hold, exhale, hold), skipping
//! holds of zero length, and reports cycle progress to the status sink
//! before each cycle starts.

use crate::phase_runner::{PhaseOutcome, PhaseRunner};
use crate::sinks::{CancelFlag, CuePlayer, ProgressSink, StatusSink, Ticker};
use crate::types::{BreathCycle, SessionStatus};
use std::sync::Arc;
use std::time::Duration;

/// How a run of the engine ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineOutcome {
    Completed,
    Cancelled,
}

/// Sequences phases across the whole cycle list
#[derive(Clone, Debug)]
pub struct CycleEngine {
    title: String,
    cycles: Arc<[BreathCycle]>,
    total_duration: Duration,
    /// 1-based number of the cycle in progress, 0 before the first one
    current_cycle: usize,
    phases_run: usize,
}

impl CycleEngine {
    pub fn new(title: impl Into<String>, cycles: impl Into<Arc<[BreathCycle]>>) -> Self {
        let cycles = cycles.into();
        Self {
            title: title.into(),
            total_duration: total_duration(&cycles),
            cycles,
            current_cycle: 0,
            phases_run: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Number of cycles started so far; never decreases
    pub fn current_cycle(&self) -> usize {
        self.current_cycle
    }

    /// Phases entered so far, including a cancelled one
    pub fn phases_run(&self) -> usize {
        self.phases_run
    }

    /// Status for the cycle currently in progress
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            title: self.title.clone(),
            total_duration: self.total_duration,
            current_cycle: self.current_cycle,
            total_cycles: self.cycles.len(),
        }
    }

    /// Run all remaining cycles
    ///
    /// Returns early with [`EngineOutcome::Cancelled`] as soon as a phase
    /// observes the cancel flag. No phase starts once the flag is set.
    pub fn run<D, A, T>(
        &mut self,
        display: &mut D,
        audio: &mut A,
        ticker: &mut T,
        cancel: &CancelFlag,
    ) -> EngineOutcome
    where
        D: ProgressSink + StatusSink,
        A: CuePlayer,
        T: Ticker,
    {
        tracing::info!(
            "Running {} cycles of '{}' ({:?} total)",
            self.cycles.len(),
            self.title,
            self.total_duration
        );

        let cycles = Arc::clone(&self.cycles);
        for (index, cycle) in cycles.iter().enumerate() {
            if cancel.is_cancelled() {
                return self.cancelled();
            }

            self.current_cycle = index + 1;
            display.set_status(&self.status());
            StatusSink::render(&mut *display);

            for phase in cycle.phases() {
                if cancel.is_cancelled() {
                    return self.cancelled();
                }

                self.phases_run += 1;
                let outcome =
                    PhaseRunner::new(&mut *display, &mut *audio, &mut *ticker, cancel).run(phase);
                if outcome == PhaseOutcome::Cancelled {
                    return self.cancelled();
                }
            }
        }

        tracing::info!("All {} cycles completed", self.cycles.len());
        EngineOutcome::Completed
    }

    fn cancelled(&self) -> EngineOutcome {
        tracing::info!(
            "Cancelled during cycle {} of {}",
            self.current_cycle,
            self.cycles.len()
        );
        EngineOutcome::Cancelled
    }
}

/// Sum of every phase duration over every cycle
pub fn total_duration(cycles: &[BreathCycle]) -> Duration {
    cycles
        .iter()
        .map(BreathCycle::total)
        .fold(Duration::ZERO, Duration::saturating_add)
}
