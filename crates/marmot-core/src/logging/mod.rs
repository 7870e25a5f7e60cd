//! Logging and instrumentation subsystem.
//!
//! A process owns one [`LogContext`], built at startup and passed by handle
//! to everything that logs. File sinks rotate by size, the console sink is
//! colorized when the terminal supports it, and entry points get wrapped by
//! [`instrument`] so invocation/success/failure records are emitted without
//! touching handler code.

use std::fmt;

use chrono::{DateTime, Local};

pub mod colored;
pub mod context;
pub mod instrument;
pub mod registry;
pub mod rotate;
pub mod tail;

pub use context::{LogContext, Logger};
pub use instrument::{instrument, EntryKind, EntryPoint, Instrumented, Invocation};
pub use registry::resolve;
pub use tail::read_log_tail;

// ============== Levels ==============

/// Severity of a log record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============== Records ==============

/// One emitted message, alive only for the duration of formatting/writing.
///
/// Fields are borrowed; sinks format what they need and never hold on to the
/// record, so there is no shared mutable state between sinks.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub logger: &'a str,
    pub message: &'a str,
    /// Extra failure context (error chain), written on its own lines by the
    /// file formatter.
    pub detail: Option<&'a str>,
}
