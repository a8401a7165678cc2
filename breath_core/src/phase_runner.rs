//! Runs one breathing phase to completion.

use crate::cue_clock::CueClock;
use crate::sinks::{CancelFlag, CuePlayer, ProgressSink, Ticker};
use crate::types::{BarDirection, CueToken, Phase};

/// How a phase ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseOutcome {
    Finished,
    Cancelled,
}

/// Drives a single phase against the progress sink and the cue player
pub struct PhaseRunner<'a, P, A, T> {
    progress: &'a mut P,
    audio: &'a mut A,
    ticker: &'a mut T,
    cancel: &'a CancelFlag,
}

impl<'a, P, A, T> PhaseRunner<'a, P, A, T>
where
    P: ProgressSink,
    A: CuePlayer,
    T: Ticker,
{
    pub fn new(
        progress: &'a mut P,
        audio: &'a mut A,
        ticker: &'a mut T,
        cancel: &'a CancelFlag,
    ) -> Self {
        Self {
            progress,
            audio,
            ticker,
            cancel,
        }
    }

    /// Run `phase` until its last tick or until cancellation is observed
    ///
    /// The entry state is always pushed. Cancellation is checked after
    /// every tick's sleep; once seen, nothing more is written.
    pub fn run(&mut self, phase: Phase) -> PhaseOutcome {
        let clock = CueClock::new(phase.duration);
        tracing::debug!(
            "Starting {} phase: {:?} ({} ticks)",
            phase.kind,
            phase.duration,
            clock.total_ticks()
        );

        self.progress.set_label(&phase.label());
        self.progress.set_color(phase.kind);
        self.audio.request_cue(&CueToken::Phase(phase.kind));
        let initial = match phase.kind.direction() {
            BarDirection::Filling => 0,
            BarDirection::Draining => 100,
        };
        self.progress.set_percent(initial);
        self.progress.render();

        for tick in clock.ticks() {
            self.ticker.wait_tick();
            if self.cancel.is_cancelled() {
                tracing::debug!(
                    "{} phase cancelled after {} ticks",
                    phase.kind,
                    tick.elapsed - 1
                );
                return PhaseOutcome::Cancelled;
            }

            if let Some(cue) = tick.cue {
                tracing::debug!("Countdown cue {}", cue);
                self.audio.request_cue(&cue);
            }

            self.progress.set_percent(phase.kind.display_percent(tick.percent));
            self.progress.render();
        }

        PhaseOutcome::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, InstantTicker, Recorder};
    use crate::types::PhaseKind;
    use std::time::Duration;

    fn run_phase(kind: PhaseKind, millis: u64) -> (PhaseOutcome, Vec<Event>) {
        let recorder = Recorder::new();
        let mut display = recorder.clone();
        let mut audio = recorder.clone();
        let mut ticker = InstantTicker::new();
        let cancel = CancelFlag::new();

        let outcome = PhaseRunner::new(&mut display, &mut audio, &mut ticker, &cancel)
            .run(Phase::new(kind, Duration::from_millis(millis)));
        (outcome, recorder.events())
    }

    #[test]
    fn test_entry_side_effects() {
        let (outcome, events) = run_phase(PhaseKind::Inhale, 4000);
        assert_eq!(outcome, PhaseOutcome::Finished);
        assert_eq!(
            &events[..5],
            &[
                Event::Label("Inhale for 4.0 seconds".into()),
                Event::Color(PhaseKind::Inhale),
                Event::Cue(CueToken::Phase(PhaseKind::Inhale)),
                Event::Percent(0),
                Event::RenderProgress,
            ]
        );
    }

    #[test]
    fn test_one_phase_cue_per_run() {
        let (_, events) = run_phase(PhaseKind::Hold, 4000);
        let words = events
            .iter()
            .filter(|e| matches!(e, Event::Cue(c) if c.is_word()))
            .count();
        assert_eq!(words, 1);
    }

    #[test]
    fn test_inhale_percent_rises_to_full() {
        let (_, events) = run_phase(PhaseKind::Inhale, 1000);
        let percents = Recorder::percents(&events);
        assert_eq!(percents.len(), 11);
        assert_eq!(percents[0], 0);
        assert_eq!(*percents.last().unwrap(), 100);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_exhale_percent_is_inverted() {
        let (_, events) = run_phase(PhaseKind::Exhale, 1000);
        let percents = Recorder::percents(&events);
        assert_eq!(percents[0], 100);
        assert_eq!(percents[3], 70);
        assert_eq!(*percents.last().unwrap(), 0);
        assert!(percents.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_countdown_cues_are_requested() {
        let (_, events) = run_phase(PhaseKind::Exhale, 3500);
        let counts: Vec<CueToken> = events
            .iter()
            .filter_map(|e| match e {
                Event::Cue(c) if c.is_number() => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![CueToken::Count(2), CueToken::Count(1)]);
    }

    #[test]
    fn test_zero_duration_only_enters() {
        let (outcome, events) = run_phase(PhaseKind::Inhale, 0);
        assert_eq!(outcome, PhaseOutcome::Finished);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_cancel_stops_sink_writes() {
        let recorder = Recorder::new();
        let mut display = recorder.clone();
        let mut audio = recorder.clone();
        let cancel = CancelFlag::new();
        let mut ticker = InstantTicker::cancelling_after(3, cancel.clone());

        let outcome = PhaseRunner::new(&mut display, &mut audio, &mut ticker, &cancel)
            .run(Phase::new(PhaseKind::Inhale, Duration::from_secs(4)));

        assert_eq!(outcome, PhaseOutcome::Cancelled);
        assert_eq!(ticker.count(), 3);
        // entry state plus the two ticks completed before the flag was raised
        let percents = Recorder::percents(&recorder.events());
        assert_eq!(percents, vec![0, 3, 5]);
    }
}
