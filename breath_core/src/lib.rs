#![forbid(unsafe_code)]

//! Core domain model and timing engine for the breathe guide.
//!
//! This crate provides:
//! - Domain types (breath cycles, phases, cues)
//! - The cue clock, phase runner and cycle engine
//! - Session lifecycle with cooperative cancellation
//! - Built-in presets and cycle generators
//! - Configuration, sound modes and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod audio;
pub mod presets;
pub mod sinks;
pub mod cue_clock;
pub mod phase_runner;
pub mod engine;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, CustomPattern};
pub use audio::{CueBank, Silent, SoundMode};
pub use presets::{
    generate_breath_cycles, get_default_presets, long_ramp, long_ramp_title, Preset,
    PresetCatalog,
};
pub use sinks::{CancelFlag, CuePlayer, ProgressSink, SleepTicker, StatusSink, Ticker};
pub use cue_clock::{ClockTick, CueClock};
pub use phase_runner::{PhaseOutcome, PhaseRunner};
pub use engine::{total_duration, CycleEngine, EngineOutcome};
pub use session::{KeySource, Session, SessionReport, SessionState, Surface};
