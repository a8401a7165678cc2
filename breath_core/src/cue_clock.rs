//! Tick arithmetic for a single phase.
//!
//! A phase of `n` ticks is stepped through `n` times. After each tick the
//! clock reports the logical progress percent and, inside the final
//! countdown, the number of seconds being counted down. All arithmetic is
//! integer so long sessions do not drift.

use crate::types::{ticks_for, CueToken};
use std::time::Duration;

/// What happens at one elapsed tick of a phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTick {
    /// 1-based number of ticks elapsed in the phase
    pub elapsed: u64,
    /// Logical progress, 0..=100
    pub percent: u8,
    /// Countdown cue to request at this tick
    pub cue: Option<CueToken>,
}

/// Converts a phase duration into its tick sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CueClock {
    total_ticks: u64,
    first_second_threshold: i64,
}

impl CueClock {
    pub fn new(duration: Duration) -> Self {
        Self::from_ticks(ticks_for(duration))
    }

    pub fn from_ticks(total_ticks: u64) -> Self {
        let total = total_ticks as i64;
        Self {
            total_ticks,
            first_second_threshold: total - 10 - total % 10 + 1,
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Logical percent once `remaining` ticks are left, rounded half up
    pub fn percent(&self, remaining: u64) -> u8 {
        if self.total_ticks == 0 {
            return 100;
        }
        let remaining = remaining.min(self.total_ticks);
        let done = self.total_ticks - remaining;
        ((done * 200 + self.total_ticks) / (self.total_ticks * 2)) as u8
    }

    /// Countdown digit for a tick that starts with `countdown` ticks left
    ///
    /// Fires once per whole second and never within the phase's first
    /// elapsed second, which belongs to the phase-name cue.
    pub fn countdown_cue(&self, countdown: u64) -> Option<CueToken> {
        if countdown > 0 && (countdown as i64) < self.first_second_threshold && countdown % 10 == 0
        {
            Some(CueToken::Count(countdown / 10))
        } else {
            None
        }
    }

    /// The tick after `elapsed` ticks (1-based) of the phase
    pub fn tick(&self, elapsed: u64) -> ClockTick {
        let elapsed = elapsed.clamp(1, self.total_ticks.max(1));
        let countdown = self.total_ticks + 1 - elapsed;
        ClockTick {
            elapsed,
            percent: self.percent(self.total_ticks.saturating_sub(elapsed)),
            cue: self.countdown_cue(countdown),
        }
    }

    /// Every tick of the phase, in order
    pub fn ticks(&self) -> impl Iterator<Item = ClockTick> + '_ {
        (1..=self.total_ticks).map(move |elapsed| self.tick(elapsed))
    }
}
