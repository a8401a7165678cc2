//! Built-in exercise presets and cycle-list generators.
//!
//! Each preset is a fixed breath cycle repeated a number of times. The
//! `long` exercise is generated from a ramp instead.

use crate::types::{BreathCycle, TICK_MILLIS};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Duration;

/// Cached default presets - built once and reused
static DEFAULT_PRESETS: Lazy<PresetCatalog> = Lazy::new(build_default_presets);

/// Get a reference to the cached default presets
pub fn get_default_presets() -> &'static PresetCatalog {
    &DEFAULT_PRESETS
}

/// A named, repeatable breathing exercise
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    /// Subcommand name, e.g. "box-long"
    pub name: String,
    /// Title shown in the status box
    pub title: String,
    pub description: String,
    pub cycle: BreathCycle,
    pub cycles: usize,
}

impl Preset {
    pub fn breath_cycles(&self) -> Vec<BreathCycle> {
        generate_breath_cycles(self.cycle, self.cycles)
    }

    /// Saturates instead of overflowing for absurd cycle counts
    pub fn total_duration(&self) -> Duration {
        let cycles = u32::try_from(self.cycles).unwrap_or(u32::MAX);
        self.cycle.total().saturating_mul(cycles)
    }

    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            name: self.name.clone(),
            title: self.title.clone(),
            inhale_ms: self.cycle.inhale().as_millis() as u64,
            inhale_hold_ms: self.cycle.inhale_hold().as_millis() as u64,
            exhale_ms: self.cycle.exhale().as_millis() as u64,
            exhale_hold_ms: self.cycle.exhale_hold().as_millis() as u64,
            cycles: self.cycles,
            total_seconds: self.total_duration().as_secs_f64(),
        }
    }
}

/// Flat view of a preset for listings
#[derive(Clone, Debug, Serialize)]
pub struct PresetSummary {
    pub name: String,
    pub title: String,
    pub inhale_ms: u64,
    pub inhale_hold_ms: u64,
    pub exhale_ms: u64,
    pub exhale_hold_ms: u64,
    pub cycles: usize,
    pub total_seconds: f64,
}

/// Ordered collection of presets
#[derive(Clone, Debug, Default)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Add a preset, replacing one with the same name
    pub fn insert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Check every preset, returning a description of each problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for preset in &self.presets {
            if preset.cycles == 0 {
                errors.push(format!("Preset '{}' has no cycles", preset.name));
            }
            for problem in validate_cycle(&preset.cycle) {
                errors.push(format!("Preset '{}': {}", preset.name, problem));
            }
        }
        errors
    }
}

/// Problems with a single cycle
///
/// Durations off the 100 ms grid are reported, not rounded: the engine
/// truncates them to whole ticks.
pub fn validate_cycle(cycle: &BreathCycle) -> Vec<String> {
    let mut problems = Vec::new();
    if cycle.inhale().is_zero() {
        problems.push("inhale duration is zero".to_string());
    }
    if cycle.exhale().is_zero() {
        problems.push("exhale duration is zero".to_string());
    }
    let names = ["inhale", "inhale hold", "exhale", "exhale hold"];
    for (name, duration) in names.iter().zip(cycle.durations()) {
        if duration.as_millis() % TICK_MILLIS as u128 != 0 {
            problems.push(format!(
                "{} of {}ms is not a multiple of {}ms and will be truncated",
                name,
                duration.as_millis(),
                TICK_MILLIS
            ));
        }
    }
    problems
}

/// Repeat one cycle `count` times
pub fn generate_breath_cycles(cycle: BreathCycle, count: usize) -> Vec<BreathCycle> {
    vec![cycle; count]
}

/// Cycles for long-breath training
///
/// For every inhale length from `start_seconds` to `end_seconds` inclusive,
/// `cycles_per_step` cycles with an exhale twice as long and no holds.
pub fn long_ramp(start_seconds: u32, end_seconds: u32, cycles_per_step: u32) -> Vec<BreathCycle> {
    let mut cycles = Vec::new();
    for seconds in start_seconds..=end_seconds {
        let inhale = Duration::from_secs(seconds as u64);
        let cycle = BreathCycle::new(inhale, Duration::ZERO, inhale * 2, Duration::ZERO);
        cycles.extend(generate_breath_cycles(cycle, cycles_per_step as usize));
    }
    cycles
}

pub fn long_ramp_title(start_seconds: u32, end_seconds: u32, cycles_per_step: u32) -> String {
    format!(
        "Long breathing training from {} seconds to {} seconds with {} cycles",
        start_seconds, end_seconds, cycles_per_step
    )
}

/// Builds the built-in presets
///
/// Prefer `get_default_presets()` for the cached copy.
pub fn build_default_presets() -> PresetCatalog {
    let mut catalog = PresetCatalog::default();

    catalog.insert(Preset {
        name: "box".into(),
        title: "Box breathe cycle (4x4s)".into(),
        description: "Navy SEALs use the box breathing cycle to calm themselves down. \
                      4 seconds inhale, 4 seconds hold, 4 seconds exhale, 4 seconds hold."
            .into(),
        cycle: BreathCycle::from_millis(4000, 4000, 4000, 4000),
        cycles: 20,
    });

    catalog.insert(Preset {
        name: "box-long".into(),
        title: "Long box breathe cycle (4s/4s/6s/2s)".into(),
        description: "A longer exhale variant of box breathing. \
                      4 seconds inhale, 4 seconds hold, 6 seconds exhale, 2 seconds hold."
            .into(),
        cycle: BreathCycle::from_millis(4000, 4000, 6000, 2000),
        cycles: 20,
    });

    catalog.insert(Preset {
        name: "ideal".into(),
        title: "Ideal breath cycle: 5.5 seconds inhale and 5.5 seconds exhale".into(),
        description: "According to studies, the ideal way to breathe is inhale for \
                      5.5 seconds and exhale for 5.5 seconds."
            .into(),
        cycle: BreathCycle::from_millis(5500, 0, 5500, 0),
        cycles: 55,
    });

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::total_duration;

    #[test]
    fn test_generate_breath_cycles() {
        let cycle = BreathCycle::from_millis(5500, 0, 5500, 0);
        let cycles = generate_breath_cycles(cycle, 3);
        assert_eq!(cycles.len(), 3);
        assert!(cycles.iter().all(|c| *c == cycle));
        assert!(generate_breath_cycles(cycle, 0).is_empty());
    }

    #[test]
    fn test_long_ramp() {
        let cycles = long_ramp(4, 6, 2);
        assert_eq!(cycles.len(), 6);
        assert_eq!(cycles[0], BreathCycle::from_millis(4000, 0, 8000, 0));
        assert_eq!(cycles[1], BreathCycle::from_millis(4000, 0, 8000, 0));
        assert_eq!(cycles[5], BreathCycle::from_millis(6000, 0, 12000, 0));
        assert_eq!(total_duration(&cycles), Duration::from_secs(2 * (12 + 15 + 18)));
    }

    #[test]
    fn test_long_ramp_empty_cases() {
        assert!(long_ramp(10, 4, 3).is_empty());
        assert!(long_ramp(4, 10, 0).is_empty());
    }

    #[test]
    fn test_default_presets() {
        let catalog = get_default_presets();
        assert_eq!(catalog.len(), 3);

        let box_long = catalog.get("box-long").unwrap();
        assert_eq!(box_long.total_duration(), Duration::from_secs(320));
        assert_eq!(box_long.breath_cycles().len(), 20);

        let ideal = catalog.get("ideal").unwrap();
        assert_eq!(ideal.total_duration(), Duration::from_secs(605));
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn test_total_duration_saturates() {
        let preset = Preset {
            name: "huge".into(),
            title: "Huge".into(),
            description: String::new(),
            cycle: BreathCycle::from_millis(u64::MAX, u64::MAX, u64::MAX, u64::MAX),
            cycles: usize::MAX,
        };
        assert_eq!(preset.total_duration(), Duration::MAX);

        let endless =
            BreathCycle::new(Duration::MAX, Duration::ZERO, Duration::ZERO, Duration::ZERO);
        assert_eq!(total_duration(&[endless, endless]), Duration::MAX);
    }

    #[test]
    fn test_default_presets_validate() {
        let errors = build_default_presets().validate();
        assert!(errors.is_empty(), "Default presets have errors: {:?}", errors);
    }

    #[test]
    fn test_validate_flags_misaligned_durations() {
        let problems = validate_cycle(&BreathCycle::from_millis(4050, 0, 4000, 0));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("truncated"));

        let problems = validate_cycle(&BreathCycle::from_millis(0, 0, 0, 0));
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut catalog = build_default_presets();
        let mut custom = catalog.get("box").unwrap().clone();
        custom.cycles = 5;
        catalog.insert(custom);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("box").unwrap().cycles, 5);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = get_default_presets().get("box").unwrap().summary();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"name\":\"box\""));
        assert!(json.contains("\"total_seconds\":320.0"));
    }
}
