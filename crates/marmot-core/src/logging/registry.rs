//! Static sink configuration and environment profiles.
//!
//! Everything in this module is declarative and read-only at runtime:
//! changing behavior means editing these tables and re-running
//! [`LogContext::initialize`](super::context::LogContext::initialize).

use super::Level;

// ============== Logger Table ==============

/// Declared minimum level for one named logger.
#[derive(Clone, Copy, Debug)]
pub struct LoggerSpec {
    pub name: &'static str,
    pub level: Level,
}

/// Main loggers and their default levels.
///
/// Hierarchical names are children of their dot-prefix for record fan-out,
/// but each entry keeps its own independent level.
pub const LOGGERS: &[LoggerSpec] = &[
    LoggerSpec {
        name: "telegram",
        level: Level::Debug,
    },
    // Reduce HTTP request noise.
    LoggerSpec {
        name: "telegram.http",
        level: Level::Info,
    },
    LoggerSpec {
        name: "bot",
        level: Level::Info,
    },
    LoggerSpec {
        name: "bot.commands",
        level: Level::Info,
    },
    LoggerSpec {
        name: "bot.events",
        level: Level::Debug,
    },
];

/// The fixed root namespace for application loggers.
pub const ROOT_LOGGER: &str = "bot";

/// Top-level logger groups. Names under one of these are considered fully
/// qualified; anything else gets nested under [`ROOT_LOGGER`].
pub const LOGGER_GROUPS: &[&str] = &["telegram", "bot"];

// ============== File Sinks ==============

/// Rotating-file parameters for one logger group.
#[derive(Clone, Copy, Debug)]
pub struct FileSinkSpec {
    pub logger: &'static str,
    /// Filename relative to the context's log directory.
    pub filename: &'static str,
    pub max_bytes: u64,
    pub backup_count: u32,
}

pub const FILES: &[FileSinkSpec] = &[
    FileSinkSpec {
        logger: "telegram",
        filename: "telegram.log",
        max_bytes: 32 * 1024 * 1024,
        backup_count: 5,
    },
    FileSinkSpec {
        logger: "bot",
        filename: "bot.log",
        max_bytes: 16 * 1024 * 1024,
        backup_count: 3,
    },
];

/// Plain-text file line layout: `[date] [LEVEL   ] name: message`.
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============== Console Sink ==============

#[derive(Clone, Copy, Debug)]
pub struct ConsoleSpec {
    pub enabled: bool,
    pub level: Level,
}

/// Console line layout: `time | LEVEL    | name                 | message`.
pub const CONSOLE: ConsoleSpec = ConsoleSpec {
    enabled: true,
    level: Level::Info,
};

pub const CONSOLE_DATE_FORMAT: &str = "%H:%M:%S";

/// Top-level loggers that receive the console sink.
pub const CONSOLE_LOGGERS: &[&str] = &["telegram", "bot"];

// ============== Environment Profiles ==============

/// A named bundle of level and color defaults, selected once at startup.
#[derive(Clone, Copy, Debug)]
pub struct EnvironmentProfile {
    pub name: &'static str,
    pub console_level: Level,
    pub file_level: Level,
    /// Per-logger level overrides applied on top of [`LOGGERS`].
    pub overrides: &'static [(&'static str, Level)],
    pub colored_console: bool,
}

const DEVELOPMENT: EnvironmentProfile = EnvironmentProfile {
    name: "development",
    console_level: Level::Debug,
    file_level: Level::Debug,
    overrides: &[("telegram.http", Level::Debug)],
    colored_console: true,
};

const PRODUCTION: EnvironmentProfile = EnvironmentProfile {
    name: "production",
    console_level: Level::Info,
    file_level: Level::Info,
    overrides: &[("telegram.http", Level::Warning)],
    colored_console: true,
};

const MINIMAL: EnvironmentProfile = EnvironmentProfile {
    name: "minimal",
    console_level: Level::Warning,
    file_level: Level::Info,
    overrides: &[("telegram.http", Level::Error)],
    colored_console: false,
};

/// Map an environment name to its profile.
///
/// Unknown names fall back to `production`; this never fails.
pub fn resolve(environment: &str) -> &'static EnvironmentProfile {
    match environment {
        "development" => &DEVELOPMENT,
        "production" => &PRODUCTION,
        "minimal" => &MINIMAL,
        _ => &PRODUCTION,
    }
}
