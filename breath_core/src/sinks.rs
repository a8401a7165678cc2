//! Collaborator contracts used by the cycle engine.
//!
//! The engine thread is the only writer of these sinks, so none of them
//! need interior locking.

use crate::types::{CueToken, PhaseKind, SessionStatus, TICK};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives the gauge state of the active phase
pub trait ProgressSink {
    /// Displayed percent, 0..=100
    fn set_percent(&mut self, percent: u8);
    fn set_color(&mut self, kind: PhaseKind);
    fn set_label(&mut self, label: &str);
    fn render(&mut self);
}

/// Receives the session status shown below the gauge
pub trait StatusSink {
    fn set_status(&mut self, status: &SessionStatus);
    fn render(&mut self);
}

/// Plays named cues
///
/// Implementations must treat unknown cues and disabled sound as a no-op.
pub trait CuePlayer {
    fn request_cue(&mut self, cue: &CueToken);
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn request_cue(&mut self, cue: &CueToken) {
        (**self).request_cue(cue)
    }
}

/// Blocks for one engine tick
pub trait Ticker {
    fn wait_tick(&mut self);
}

/// Real-time ticker backed by `thread::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepTicker;

impl Ticker for SleepTicker {
    fn wait_tick(&mut self) {
        std::thread::sleep(TICK);
    }
}

/// One-shot cancellation signal shared between the foreground and the engine
///
/// Once set it is never cleared.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared_and_sticky() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());

        flag.cancel();
        assert!(other.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
    }
}
