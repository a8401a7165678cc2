//! Recording collaborators for unit tests.

use crate::sinks::{CancelFlag, CuePlayer, ProgressSink, StatusSink, Ticker};
use crate::types::{CueToken, PhaseKind, SessionStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Percent(u8),
    Color(PhaseKind),
    Label(String),
    RenderProgress,
    Status(SessionStatus),
    RenderStatus,
    Cue(CueToken),
}

/// Display and cue player that appends every call to a shared log
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn percents(events: &[Event]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Percent(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Labels in order, one per phase entry
    pub fn labels(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Label(l) => Some(l.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(events: &[Event]) -> Vec<SessionStatus> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for Recorder {
    fn set_percent(&mut self, percent: u8) {
        self.push(Event::Percent(percent));
    }

    fn set_color(&mut self, kind: PhaseKind) {
        self.push(Event::Color(kind));
    }

    fn set_label(&mut self, label: &str) {
        self.push(Event::Label(label.to_string()));
    }

    fn render(&mut self) {
        self.push(Event::RenderProgress);
    }
}

impl StatusSink for Recorder {
    fn set_status(&mut self, status: &SessionStatus) {
        self.push(Event::Status(status.clone()));
    }

    fn render(&mut self) {
        self.push(Event::RenderStatus);
    }
}

impl CuePlayer for Recorder {
    fn request_cue(&mut self, cue: &CueToken) {
        self.push(Event::Cue(*cue));
    }
}

/// Ticker that returns immediately, optionally raising a cancel flag
#[derive(Clone, Debug, Default)]
pub struct InstantTicker {
    count: Arc<AtomicU64>,
    cancel_at: Option<(u64, CancelFlag)>,
}

impl InstantTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `flag` during the `n`th tick
    pub fn cancelling_after(n: u64, flag: CancelFlag) -> Self {
        Self {
            count: Arc::default(),
            cancel_at: Some((n, flag)),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Ticker for InstantTicker {
    fn wait_tick(&mut self) {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, flag)) = &self.cancel_at {
            if n >= *at {
                flag.cancel();
            }
        }
    }
}
