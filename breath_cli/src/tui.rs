//! Full-screen terminal display: a phase gauge above a status box.

use breath_core::{
    Error, KeySource, PhaseKind, ProgressSink, Result, SessionStatus, StatusSink, Surface,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;

/// Rows the gauge needs (one line plus borders)
const GAUGE_ROWS: u16 = 3;

/// Restore terminal to normal state.
///
/// Safe to call more than once.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
}

/// Raw mode plus alternate screen, held for the length of a session
pub struct TerminalSurface {
    _private: (),
}

impl TerminalSurface {
    /// Switch the terminal into full-screen mode
    ///
    /// Fails without touching the terminal when it is not a TTY or has
    /// fewer rows than the layout needs.
    pub fn acquire(status_rows: u16) -> Result<Self> {
        let (_, rows) = crossterm::terminal::size()
            .map_err(|e| Error::Terminal(format!("cannot query terminal size: {}", e)))?;
        let needed = GAUGE_ROWS + status_rows;
        if rows < needed {
            return Err(Error::Terminal(format!(
                "terminal has {} rows, at least {} are needed",
                rows, needed
            )));
        }

        enable_raw_mode().map_err(|e| Error::Terminal(format!("cannot enable raw mode: {}", e)))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide) {
            restore_terminal();
            return Err(Error::Terminal(format!(
                "cannot enter alternate screen: {}",
                e
            )));
        }

        // Restore the terminal before the panic message is printed
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));

        tracing::debug!("Terminal acquired");
        Ok(Self { _private: () })
    }
}

impl Surface for TerminalSurface {
    fn release(&mut self) {
        restore_terminal();
        tracing::debug!("Terminal released");
    }
}

struct GaugeState {
    percent: u8,
    kind: PhaseKind,
    label: String,
}

/// Progress and status sinks drawn with ratatui
///
/// Lives on the engine thread; it is the only writer of the screen.
pub struct TuiDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    gauge: GaugeState,
    status: String,
    status_rows: u16,
}

impl TuiDisplay {
    pub fn new(status_rows: u16) -> Result<Self> {
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|e| Error::Terminal(format!("cannot create terminal: {}", e)))?;
        terminal
            .clear()
            .map_err(|e| Error::Terminal(format!("cannot clear terminal: {}", e)))?;

        Ok(Self {
            terminal,
            gauge: GaugeState {
                percent: 0,
                kind: PhaseKind::Inhale,
                label: String::new(),
            },
            status: "Breathe".into(),
            status_rows,
        })
    }

    fn draw(&mut self) {
        let gauge = &self.gauge;
        let status = self.status.as_str();
        let status_rows = self.status_rows;
        if let Err(e) = self
            .terminal
            .draw(|f| draw_ui(f, gauge, status, status_rows))
        {
            tracing::warn!("Failed to redraw: {}", e);
        }
    }
}

fn phase_color(kind: PhaseKind) -> Color {
    match kind {
        PhaseKind::Inhale => Color::Green,
        PhaseKind::Exhale => Color::Blue,
        PhaseKind::Hold => Color::Yellow,
    }
}

fn draw_ui(f: &mut Frame, gauge: &GaugeState, status: &str, status_rows: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(GAUGE_ROWS), Constraint::Length(status_rows)])
        .split(f.area());

    let bar = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(phase_color(gauge.kind)))
        .percent(gauge.percent.min(100) as u16)
        .label(gauge.label.as_str());
    f.render_widget(bar, chunks[0]);

    let text = Paragraph::new(status)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(text, chunks[1]);
}

impl ProgressSink for TuiDisplay {
    fn set_percent(&mut self, percent: u8) {
        self.gauge.percent = percent;
    }

    fn set_color(&mut self, kind: PhaseKind) {
        self.gauge.kind = kind;
    }

    fn set_label(&mut self, label: &str) {
        self.gauge.label = label.to_string();
    }

    fn render(&mut self) {
        self.draw();
    }
}

impl StatusSink for TuiDisplay {
    fn set_status(&mut self, status: &SessionStatus) {
        self.status = status.text();
    }

    fn render(&mut self) {
        self.draw();
    }
}

/// Any key press on the controlling terminal
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn wait_for_key(&mut self, timeout: Duration) -> Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key) => Ok(key.kind == KeyEventKind::Press),
            _ => Ok(false),
        }
    }
}
