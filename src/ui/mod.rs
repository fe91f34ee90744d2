//! Progress reporting
//!
//! Provides a simple API for displaying pipeline state:
//! - Current phase (Reading, Validating, Writing, Creating schema, Loading)
//! - Progress (current/total per table)
//! - Activity log lines
//!
//! Console output goes through `tracing`, so progress and log lines share
//! the subscriber's filter and format.

use tracing::{debug, info};

/// Pipeline phases
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Reading,
    Validating,
    Writing,
    CreatingSchema,
    Loading,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Reading => write!(f, "Reading input"),
            Phase::Validating => write!(f, "Validating and flattening"),
            Phase::Writing => write!(f, "Writing flat document"),
            Phase::CreatingSchema => write!(f, "Creating schema"),
            Phase::Loading => write!(f, "Loading rows"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn log(&mut self, message: impl Into<String>);
}

/// Reports progress as tracing events on the `starfield_db::ui` target
#[derive(Debug, Default)]
pub struct ConsoleUi {
    phase: Option<Phase>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        if self.phase == Some(phase) {
            return;
        }
        self.phase = Some(phase);
        info!(target: "starfield_db::ui", "{}", phase);
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let label = label.into();
        if current == total {
            info!(target: "starfield_db::ui", table = %label, rows = current, "table done");
        } else {
            debug!(target: "starfield_db::ui", table = %label, current, total, "progress");
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        info!(target: "starfield_db::ui", "{}", message.into());
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
