//! Core domain types for the breathing guide.
//!
//! This module defines the fundamental types used throughout the system:
//! - Breath cycles and the phases derived from them
//! - Cue tokens requested from the audio collaborator
//! - Status snapshots pushed to the text sink

use std::fmt;
use std::time::Duration;

/// The scheduling quantum of the engine
pub const TICK: Duration = Duration::from_millis(100);

/// Milliseconds per tick, for integer tick arithmetic
pub const TICK_MILLIS: u64 = 100;

// ============================================================================
// Breath Cycle
// ============================================================================

/// One full breath: inhale, optional hold, exhale, optional hold
///
/// A hold of zero length is skipped entirely when the cycle runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreathCycle {
    inhale: Duration,
    inhale_hold: Duration,
    exhale: Duration,
    exhale_hold: Duration,
}

impl BreathCycle {
    pub const fn new(
        inhale: Duration,
        inhale_hold: Duration,
        exhale: Duration,
        exhale_hold: Duration,
    ) -> Self {
        Self {
            inhale,
            inhale_hold,
            exhale,
            exhale_hold,
        }
    }

    /// Build a cycle from millisecond values
    pub const fn from_millis(inhale: u64, inhale_hold: u64, exhale: u64, exhale_hold: u64) -> Self {
        Self::new(
            Duration::from_millis(inhale),
            Duration::from_millis(inhale_hold),
            Duration::from_millis(exhale),
            Duration::from_millis(exhale_hold),
        )
    }

    pub const fn inhale(&self) -> Duration {
        self.inhale
    }

    pub const fn inhale_hold(&self) -> Duration {
        self.inhale_hold
    }

    pub const fn exhale(&self) -> Duration {
        self.exhale
    }

    pub const fn exhale_hold(&self) -> Duration {
        self.exhale_hold
    }

    /// Sum of all four phase durations, skipped holds included as zero
    pub fn total(&self) -> Duration {
        self.inhale + self.inhale_hold + self.exhale + self.exhale_hold
    }

    /// The phases this cycle runs, in order
    ///
    /// Inhale and exhale always run; holds only when longer than zero.
    pub fn phases(&self) -> impl Iterator<Item = Phase> {
        [
            Some(Phase::new(PhaseKind::Inhale, self.inhale)),
            (!self.inhale_hold.is_zero()).then(|| Phase::new(PhaseKind::Hold, self.inhale_hold)),
            Some(Phase::new(PhaseKind::Exhale, self.exhale)),
            (!self.exhale_hold.is_zero()).then(|| Phase::new(PhaseKind::Hold, self.exhale_hold)),
        ]
        .into_iter()
        .flatten()
    }

    /// All four durations, in phase order
    pub fn durations(&self) -> [Duration; 4] {
        [self.inhale, self.inhale_hold, self.exhale, self.exhale_hold]
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Kind of breathing phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Inhale,
    Hold,
    Exhale,
}

/// How the progress bar encodes a phase's logical progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarDirection {
    /// Bar grows from empty to full
    Filling,
    /// Bar shrinks from full to empty
    Draining,
}

impl PhaseKind {
    /// Name used for labels and the phase-name cue
    pub fn name(&self) -> &'static str {
        match self {
            PhaseKind::Inhale => "Inhale",
            PhaseKind::Hold => "Hold",
            PhaseKind::Exhale => "Exhale",
        }
    }

    pub fn direction(&self) -> BarDirection {
        match self {
            PhaseKind::Exhale => BarDirection::Draining,
            PhaseKind::Inhale | PhaseKind::Hold => BarDirection::Filling,
        }
    }

    /// Percent shown on the bar for a logical progress percent
    pub fn display_percent(&self, logical: u8) -> u8 {
        let logical = logical.min(100);
        match self.direction() {
            BarDirection::Filling => logical,
            BarDirection::Draining => 100 - logical,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A phase of a cycle with its duration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration: Duration,
}

impl Phase {
    pub fn new(kind: PhaseKind, duration: Duration) -> Self {
        Self { kind, duration }
    }

    /// Number of whole ticks the phase spans (truncating)
    pub fn ticks(&self) -> u64 {
        ticks_for(self.duration)
    }

    /// Gauge label, e.g. "Inhale for 4.0 seconds"
    pub fn label(&self) -> String {
        format!(
            "{} for {:.1} seconds",
            self.kind.name(),
            self.duration.as_millis() as f64 / 1000.0
        )
    }
}

/// Whole ticks in a duration; sub-tick remainders are dropped
pub fn ticks_for(duration: Duration) -> u64 {
    (duration.as_millis() / TICK_MILLIS as u128) as u64
}

// ============================================================================
// Cues
// ============================================================================

/// A request to play a named sound
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CueToken {
    /// Start-of-phase word ("Inhale", "Exhale", "Hold")
    Phase(PhaseKind),
    /// Seconds left in the phase
    Count(u64),
}

impl CueToken {
    pub fn name(&self) -> String {
        match self {
            CueToken::Phase(kind) => kind.name().to_string(),
            CueToken::Count(n) => n.to_string(),
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, CueToken::Phase(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CueToken::Count(_))
    }
}

impl fmt::Display for CueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CueToken::Phase(kind) => f.write_str(kind.name()),
            CueToken::Count(n) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Snapshot pushed to the status sink before each cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub title: String,
    pub total_duration: Duration,
    pub current_cycle: usize,
    pub total_cycles: usize,
}

impl SessionStatus {
    /// Multi-line text shown below the gauge
    pub fn text(&self) -> String {
        format!(
            "Always inhale through the nose!\n\n{}\nTotal duration: {}\nCycle {} of {}\n",
            self.title,
            format_duration(self.total_duration),
            self.current_cycle,
            self.total_cycles
        )
    }
}

/// Format a duration compactly: "5m20s", "1h0m5s", "5.5s", "250ms", "0s"
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms == 0 {
        return "0s".into();
    }
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let fraction = total_ms % 1000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if fraction == 0 {
        out.push_str(&format!("{}s", seconds));
    } else {
        let fraction = format!("{:03}", fraction);
        out.push_str(&format!("{}.{}s", seconds, fraction.trim_end_matches('0')));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_skip_zero_holds() {
        let cycle = BreathCycle::from_millis(4000, 0, 6000, 0);
        let kinds: Vec<_> = cycle.phases().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PhaseKind::Inhale, PhaseKind::Exhale]);
    }

    #[test]
    fn test_phases_with_all_holds() {
        let cycle = BreathCycle::from_millis(4000, 4000, 6000, 2000);
        let phases: Vec<_> = cycle.phases().collect();
        assert_eq!(phases.len(), 4);
        assert_eq!(phases[1], Phase::new(PhaseKind::Hold, Duration::from_secs(4)));
        assert_eq!(phases[3], Phase::new(PhaseKind::Hold, Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_inhale_still_runs() {
        let cycle = BreathCycle::from_millis(0, 0, 0, 0);
        assert_eq!(cycle.phases().count(), 2);
    }

    #[test]
    fn test_exhale_display_is_complement() {
        assert_eq!(PhaseKind::Exhale.display_percent(30), 70);
        assert_eq!(PhaseKind::Inhale.display_percent(30), 30);
        assert_eq!(PhaseKind::Hold.display_percent(30), 30);
    }

    #[test]
    fn test_ticks_truncate() {
        assert_eq!(ticks_for(Duration::from_millis(5500)), 55);
        assert_eq!(ticks_for(Duration::from_millis(5550)), 55);
        assert_eq!(ticks_for(Duration::from_millis(99)), 0);
    }

    #[test]
    fn test_phase_label() {
        let phase = Phase::new(PhaseKind::Inhale, Duration::from_millis(5500));
        assert_eq!(phase.label(), "Inhale for 5.5 seconds");
        let phase = Phase::new(PhaseKind::Hold, Duration::from_secs(4));
        assert_eq!(phase.label(), "Hold for 4.0 seconds");
    }

    #[test]
    fn test_cue_names() {
        assert_eq!(CueToken::Phase(PhaseKind::Exhale).name(), "Exhale");
        assert_eq!(CueToken::Count(3).to_string(), "3");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(5500)), "5.5s");
        assert_eq!(format_duration(Duration::from_secs(320)), "5m20s");
        assert_eq!(format_duration(Duration::from_secs(605)), "10m5s");
        assert_eq!(format_duration(Duration::from_secs(300)), "5m0s");
        assert_eq!(format_duration(Duration::from_secs(3605)), "1h0m5s");
    }

    #[test]
    fn test_status_text() {
        let status = SessionStatus {
            title: "Box".into(),
            total_duration: Duration::from_secs(320),
            current_cycle: 3,
            total_cycles: 20,
        };
        let text = status.text();
        assert!(text.starts_with("Always inhale through the nose!"));
        assert!(text.contains("Total duration: 5m20s"));
        assert!(text.contains("Cycle 3 of 20"));
    }
}
