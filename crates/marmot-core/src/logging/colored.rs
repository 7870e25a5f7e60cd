//! Colorized console output.
//!
//! Color applicability is decided once, when the formatter is built, from
//! explicit override variables, TTY detection and terminal-type heuristics.
//! Rendering builds colored copies of the level/name fields; the record
//! itself is never touched, so file sinks can never see escape codes.

use std::env;
use std::io::IsTerminal;

use super::registry::CONSOLE_DATE_FORMAT;
use super::{Level, Record};

// ============== ANSI Codes ==============

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BRIGHT_RED: &str = "\x1b[91m";
const BRIGHT_GREEN: &str = "\x1b[92m";
const BRIGHT_CYAN: &str = "\x1b[96m";

// ============== Color Policy ==============

fn level_color(level: Level) -> String {
    match level {
        Level::Debug => format!("{DIM}{CYAN}"),
        Level::Info => GREEN.to_string(),
        Level::Warning => YELLOW.to_string(),
        Level::Error => RED.to_string(),
        Level::Critical => format!("{BOLD}{BRIGHT_RED}"),
    }
}

/// Logger-name colors. Longest matching prefix wins; unknown names fall back
/// to white.
const LOGGER_COLORS: &[(&str, &str)] = &[
    ("telegram.http", "\x1b[2m\x1b[34m"),
    ("telegram", BLUE),
    ("bot.commands", CYAN),
    ("bot.events", BRIGHT_CYAN),
    ("bot", BRIGHT_GREEN),
];

fn logger_color(name: &str) -> &'static str {
    if let Some((_, color)) = LOGGER_COLORS.iter().find(|(pat, _)| *pat == name) {
        return color;
    }
    LOGGER_COLORS
        .iter()
        .filter(|(pat, _)| name.starts_with(pat))
        .max_by_key(|(pat, _)| pat.len())
        .map(|(_, color)| *color)
        .unwrap_or(WHITE)
}

// ============== Applicability ==============

/// Environment signals consulted when deciding whether to color output.
///
/// Captured as plain values so the precedence rules stay testable without
/// touching the process environment.
#[derive(Clone, Debug, Default)]
pub struct ColorSignals {
    pub force_color: Option<String>,
    pub no_color: Option<String>,
    pub term: Option<String>,
    pub interactive: bool,
    pub windows: bool,
}

impl ColorSignals {
    /// Snapshot the current process environment and stdout state.
    pub fn from_env() -> Self {
        Self {
            force_color: env::var("FORCE_COLOR").ok(),
            no_color: env::var("NO_COLOR").ok(),
            term: env::var("TERM").ok(),
            interactive: std::io::stdout().is_terminal(),
            windows: cfg!(windows),
        }
    }
}

fn non_blank(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Decide whether console output should be colored.
///
/// Precedence: explicit force-enable, explicit force-disable, non-interactive
/// output, then terminal-type heuristics.
pub fn should_color_with(signals: &ColorSignals) -> bool {
    if non_blank(&signals.force_color) {
        return true;
    }
    if non_blank(&signals.no_color) {
        return false;
    }
    if !signals.interactive {
        return false;
    }

    let term = signals.term.as_deref().unwrap_or("");
    if ["color", "xterm", "screen", "tmux"]
        .iter()
        .any(|t| term.contains(t))
    {
        return true;
    }

    // The legacy Windows console has no ANSI support; require the terminal
    // type itself to claim capability.
    if signals.windows {
        let term = term.to_lowercase();
        return ["xterm", "color", "ansi"].iter().any(|t| term.contains(t));
    }

    true
}

/// [`should_color_with`] over the live environment.
pub fn should_color() -> bool {
    should_color_with(&ColorSignals::from_env())
}

// ============== Console Formatter ==============

/// Formats records for the console, optionally with ANSI colors.
#[derive(Clone, Debug)]
pub struct ConsoleFormatter {
    colored: bool,
}

impl ConsoleFormatter {
    /// `colored` is the already-resolved policy (environment profile AND
    /// [`should_color`]). There is no fallible construction path: when color
    /// cannot be applied this is exactly the plain formatter.
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format(&self, record: &Record<'_>) -> String {
        let ts = record.timestamp.format(CONSOLE_DATE_FORMAT);

        // Pad first, then wrap: escape codes never count toward the column
        // widths, and the record fields stay untouched.
        let mut level = format!("{:<8}", record.level.as_str());
        let mut name = format!("{:<20}", record.logger);
        if self.colored {
            level = format!("{}{level}{RESET}", level_color(record.level));
            name = format!("{}{name}{RESET}", logger_color(record.logger));
        }

        let mut line = format!("{ts} | {level} | {name} | {}", record.message);
        if let Some(detail) = record.detail {
            line.push('\n');
            line.push_str(detail);
        }
        line
    }
}
