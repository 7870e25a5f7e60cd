//! Process-wide logging context.
//!
//! One [`LogContext`] is built at startup and passed by handle to everything
//! that logs. [`LogContext::initialize`] is idempotent: each call swaps in a
//! freshly built sink table, so reconfiguration never accumulates duplicate
//! sinks and never fails because something was already attached.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use chrono::Local;

use super::colored::{should_color, ConsoleFormatter};
use super::registry::{
    self, EnvironmentProfile, CONSOLE, CONSOLE_LOGGERS, FILES, LOGGERS, LOGGER_GROUPS, ROOT_LOGGER,
};
use super::rotate::RotatingFileSink;
use super::{Level, Record};
use crate::{Error, Result};

// ============== Sinks ==============

trait Sink: Send + Sync {
    /// Minimum level this sink accepts, on top of the logger's own gate.
    fn floor(&self) -> Level;
    fn emit(&self, record: &Record<'_>);
}

impl Sink for RotatingFileSink {
    fn floor(&self) -> Level {
        self.level()
    }

    fn emit(&self, record: &Record<'_>) {
        self.write_record(record);
    }
}

struct ConsoleSink {
    floor: Level,
    formatter: ConsoleFormatter,
}

impl Sink for ConsoleSink {
    fn floor(&self) -> Level {
        self.floor
    }

    fn emit(&self, record: &Record<'_>) {
        let line = self.formatter.format(record);
        // Locked stdout keeps interleaved emitters line-atomic.
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

// ============== Context ==============

struct ContextInner {
    environment: &'static str,
    /// Effective minimum level per registered logger (registry default with
    /// the profile override applied).
    levels: HashMap<&'static str, Level>,
    /// Attached sinks, keyed by the logger that owns them.
    sinks: HashMap<&'static str, Vec<Arc<dyn Sink>>>,
}

impl ContextInner {
    fn empty() -> Self {
        Self {
            environment: "",
            levels: HashMap::new(),
            sinks: HashMap::new(),
        }
    }
}

/// Owner of all live loggers and their sinks.
///
/// Modeled as an explicit object instead of ambient global state: construct
/// once, initialize (or re-initialize) explicitly, hand out [`Logger`]
/// handles.
pub struct LogContext {
    log_dir: PathBuf,
    inner: RwLock<ContextInner>,
}

impl LogContext {
    /// An empty context. No I/O happens until [`initialize`](Self::initialize).
    pub fn new(log_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            log_dir: log_dir.into(),
            inner: RwLock::new(ContextInner::empty()),
        })
    }

    /// Build all sinks for `environment` and swap them in, detaching
    /// whatever a previous call attached. Returns the root logger handle.
    ///
    /// An unwritable log directory or an unopenable log file is fatal here:
    /// durable logs are a requirement, so this must not degrade silently to
    /// console-only.
    pub fn initialize(self: &Arc<Self>, environment: &str) -> Result<Logger> {
        fs::create_dir_all(&self.log_dir).map_err(|e| {
            Error::Config(format!(
                "cannot create log directory {}: {e}",
                self.log_dir.display()
            ))
        })?;

        let profile = registry::resolve(environment);
        let next = self.build_inner(profile)?;
        let colored = console_colored(profile);

        {
            let mut inner = self.inner.write().map_err(|_| {
                Error::Logging("logging context lock poisoned".to_string())
            })?;
            // Dropping the old table is the detach; nothing is ever attached
            // twice.
            *inner = next;
        }

        let root = self.logger(ROOT_LOGGER);
        root.info(format!("logging initialized (environment: {})", profile.name));
        root.info(format!(
            "console level: {} | file level: {} | colored console: {}",
            profile.console_level,
            profile.file_level,
            if colored { "enabled" } else { "disabled" },
        ));
        Ok(root)
    }

    fn build_inner(&self, profile: &'static EnvironmentProfile) -> Result<ContextInner> {
        let mut levels: HashMap<&'static str, Level> = LOGGERS
            .iter()
            .map(|spec| (spec.name, spec.level))
            .collect();
        for &(name, level) in profile.overrides {
            levels.insert(name, level);
        }

        let mut sinks: HashMap<&'static str, Vec<Arc<dyn Sink>>> = HashMap::new();
        for spec in FILES {
            let sink = RotatingFileSink::open(
                self.log_dir.join(spec.filename),
                spec.max_bytes,
                spec.backup_count,
                profile.file_level,
            )?;
            sinks.entry(spec.logger).or_default().push(Arc::new(sink));
        }

        if CONSOLE.enabled {
            let formatter = ConsoleFormatter::new(console_colored(profile));
            for &logger in CONSOLE_LOGGERS {
                sinks.entry(logger).or_default().push(Arc::new(ConsoleSink {
                    floor: profile.console_level,
                    formatter: formatter.clone(),
                }));
            }
        }

        Ok(ContextInner {
            environment: profile.name,
            levels,
            sinks,
        })
    }

    /// Get (creating if necessary) a logger handle. Names not already under
    /// a registered top-level group are nested under the `bot` root.
    pub fn logger(self: &Arc<Self>, name: &str) -> Logger {
        Logger {
            ctx: Arc::clone(self),
            name: qualify(name),
        }
    }

    /// The environment the context was last initialized for.
    pub fn environment(&self) -> &'static str {
        self.inner
            .read()
            .map(|inner| inner.environment)
            .unwrap_or("")
    }

    /// Number of sinks currently attached to `name` (exact match).
    pub fn sink_count(&self, name: &str) -> usize {
        self.inner
            .read()
            .map(|inner| inner.sinks.get(name).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Effective minimum level for `name`: its registry entry if declared,
    /// else the nearest declared dotted ancestor, else the root default.
    pub fn effective_level(&self, name: &str) -> Level {
        let Ok(inner) = self.inner.read() else {
            return Level::Info;
        };
        let mut cursor = name;
        loop {
            if let Some(level) = inner.levels.get(cursor) {
                return *level;
            }
            match cursor.rfind('.') {
                Some(idx) => cursor = &cursor[..idx],
                None => return Level::Info,
            }
        }
    }

    fn emit(&self, logger: &str, level: Level, message: &str, detail: Option<&str>) {
        if level < self.effective_level(logger) {
            return;
        }
        let Ok(inner) = self.inner.read() else {
            return;
        };

        let record = Record {
            timestamp: Local::now(),
            level,
            logger,
            message,
            detail,
        };

        // Fan out to the emitting logger's sinks and each dotted ancestor's,
        // the way records propagate up a logger hierarchy.
        let mut cursor = logger;
        loop {
            if let Some(sinks) = inner.sinks.get(cursor) {
                for sink in sinks {
                    if level >= sink.floor() {
                        sink.emit(&record);
                    }
                }
            }
            match cursor.rfind('.') {
                Some(idx) => cursor = &cursor[..idx],
                None => break,
            }
        }
    }
}

fn qualify(name: &str) -> String {
    if name.is_empty() {
        return ROOT_LOGGER.to_string();
    }
    for group in LOGGER_GROUPS {
        if name == *group || name.starts_with(&format!("{group}.")) {
            return name.to_string();
        }
    }
    format!("{ROOT_LOGGER}.{name}")
}

/// Canonical dotted child name. Segments are single path components:
/// non-empty, no dots, no whitespace.
pub fn scoped_name(parent: &str, segment: &str) -> Result<String> {
    if segment.is_empty()
        || segment.contains('.')
        || segment.chars().any(char::is_whitespace)
    {
        return Err(Error::Logging(format!(
            "invalid logger segment: {segment:?}"
        )));
    }
    Ok(format!("{parent}.{segment}"))
}

fn console_colored(profile: &EnvironmentProfile) -> bool {
    profile.colored_console && should_color()
}

// ============== Logger Handle ==============

/// A named handle into the [`LogContext`]. Cheap to clone; emission is
/// fire-and-forget.
#[derive(Clone)]
pub struct Logger {
    ctx: Arc<LogContext>,
    name: String,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Arc<LogContext> {
        &self.ctx
    }

    /// Derive a child logger with a canonical dotted name.
    ///
    /// The child does not need its own registry entry: a name without one
    /// takes its effective level from the nearest declared dotted ancestor
    /// (ultimately the root default), and its records fan out to the
    /// ancestors' sinks.
    pub fn child(&self, segment: &str) -> Result<Logger> {
        Ok(Logger {
            ctx: Arc::clone(&self.ctx),
            name: scoped_name(&self.name, segment)?,
        })
    }

    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        self.ctx.emit(&self.name, level, message.as_ref(), None);
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message);
    }

    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(Level::Critical, message);
    }

    /// Error record with a failure-context block (error chain / debug
    /// rendering) appended on its own lines.
    pub fn error_with_detail(&self, message: impl AsRef<str>, detail: impl AsRef<str>) {
        self.ctx
            .emit(&self.name, Level::Error, message.as_ref(), Some(detail.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tmp(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"))
    }

    #[test]
    fn initialize_twice_does_not_duplicate_sinks() {
        let ctx = LogContext::new(tmp("ctx-idempotent"));
        ctx.initialize("production").unwrap();
        let bot = ctx.sink_count("bot");
        let telegram = ctx.sink_count("telegram");

        ctx.initialize("production").unwrap();
        assert_eq!(ctx.sink_count("bot"), bot);
        assert_eq!(ctx.sink_count("telegram"), telegram);

        // file + console on each top-level logger, nothing on children
        assert_eq!(bot, 2);
        assert_eq!(telegram, 2);
        assert_eq!(ctx.sink_count("bot.commands"), 0);
    }

    #[test]
    fn environment_overrides_apply() {
        let ctx = LogContext::new(tmp("ctx-env"));

        ctx.initialize("development").unwrap();
        assert_eq!(ctx.environment(), "development");
        assert_eq!(ctx.effective_level("telegram.http"), Level::Debug);

        ctx.initialize("production").unwrap();
        assert_eq!(ctx.effective_level("telegram.http"), Level::Warning);

        ctx.initialize("minimal").unwrap();
        assert_eq!(ctx.effective_level("telegram.http"), Level::Error);

        ctx.initialize("unknownvalue").unwrap();
        assert_eq!(ctx.environment(), "production");
    }

    #[test]
    fn unqualified_names_nest_under_root() {
        let ctx = LogContext::new(tmp("ctx-names"));
        assert_eq!(ctx.logger("commands").name(), "bot.commands");
        assert_eq!(ctx.logger("bot.events").name(), "bot.events");
        assert_eq!(ctx.logger("telegram.http").name(), "telegram.http");
        assert_eq!(ctx.logger("").name(), "bot");
    }

    #[test]
    fn child_names_are_validated() {
        let ctx = LogContext::new(tmp("ctx-child"));
        let root = ctx.logger("bot");
        assert_eq!(root.child("greetings").unwrap().name(), "bot.greetings");
        assert!(root.child("").is_err());
        assert!(root.child("a.b").is_err());
        assert!(root.child("a b").is_err());
    }

    #[test]
    fn records_propagate_to_ancestor_file_sink() {
        let dir = tmp("ctx-fanout");
        let ctx = LogContext::new(&dir);
        ctx.initialize("development").unwrap();

        ctx.logger("commands").info("ping handled");
        let log = fs::read_to_string(dir.join("bot.log")).unwrap();
        assert!(log.contains("bot.commands: ping handled"));
        // Nothing from the bot group leaks into the telegram file.
        let telegram = fs::read_to_string(dir.join("telegram.log")).unwrap();
        assert!(!telegram.contains("ping handled"));
    }

    #[test]
    fn level_gate_uses_effective_level() {
        let dir = tmp("ctx-gate");
        let ctx = LogContext::new(&dir);
        ctx.initialize("production").unwrap();

        // telegram.http is overridden to WARNING in production.
        ctx.logger("telegram.http").info("GET /updates 200");
        ctx.logger("telegram.http").warning("rate limited");

        let log = fs::read_to_string(dir.join("telegram.log")).unwrap();
        assert!(!log.contains("GET /updates"));
        assert!(log.contains("rate limited"));
    }

    #[test]
    fn file_level_follows_profile() {
        let dir = tmp("ctx-filelevel");
        let ctx = LogContext::new(&dir);

        ctx.initialize("production").unwrap();
        ctx.logger("events").debug("invisible in production");

        ctx.initialize("development").unwrap();
        ctx.logger("events").debug("visible in development");

        let log = fs::read_to_string(dir.join("bot.log")).unwrap();
        assert!(!log.contains("invisible in production"));
        assert!(log.contains("visible in development"));
    }

    #[test]
    fn unregistered_names_resolve_via_nearest_ancestor() {
        let ctx = LogContext::new(tmp("ctx-ancestor"));
        ctx.initialize("production").unwrap();

        // bot.greetings has no registry entry; bot (INFO) covers it.
        assert_eq!(ctx.effective_level("bot.greetings"), Level::Info);
        // bot.events.member has no entry; bot.events (DEBUG) covers it.
        assert_eq!(ctx.effective_level("bot.events.member"), Level::Debug);
        // Nothing declared at all falls back to the root default.
        assert_eq!(ctx.effective_level("orphan"), Level::Info);
    }

    #[test]
    fn file_output_is_never_colored() {
        let dir = tmp("ctx-nocolor");
        let ctx = LogContext::new(&dir);
        // development has the colored console enabled
        ctx.initialize("development").unwrap();

        ctx.logger("bot").warning("plain on disk");
        let log = fs::read_to_string(dir.join("bot.log")).unwrap();
        assert!(log.contains("[WARNING ] bot: plain on disk"));
        assert!(!log.contains('\x1b'));
    }

    /// Drop the fixed-width `[timestamp] ` prefix so runs straddling a
    /// second boundary still compare equal.
    fn strip_timestamps(log: &str) -> String {
        log.lines().map(|l| &l[22..]).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn file_bytes_identical_with_and_without_console_color() {
        let colored_dir = tmp("ctx-bytes-colored");
        let plain_dir = tmp("ctx-bytes-plain");

        // development carries the colored console, minimal disables it; the
        // telegram logger and file floor accept INFO in both.
        let with_color = LogContext::new(&colored_dir);
        with_color.initialize("development").unwrap();
        let without_color = LogContext::new(&plain_dir);
        without_color.initialize("minimal").unwrap();

        for ctx in [&with_color, &without_color] {
            ctx.logger("telegram").info("gateway connected");
            ctx.logger("telegram").warning("gateway latency high");
        }

        // The colored rendering of the same fields really does produce
        // escape codes in-process...
        let record = Record {
            timestamp: Local::now(),
            level: Level::Warning,
            logger: "telegram",
            message: "gateway latency high",
            detail: None,
        };
        assert!(ConsoleFormatter::new(true).format(&record).contains('\x1b'));

        // ...while the file sinks stay byte-identical either way.
        let a = fs::read_to_string(colored_dir.join("telegram.log")).unwrap();
        let b = fs::read_to_string(plain_dir.join("telegram.log")).unwrap();
        assert_eq!(strip_timestamps(&a), strip_timestamps(&b));
        assert!(a.contains("telegram: gateway latency high"));
    }

    #[test]
    fn error_detail_lands_on_its_own_lines() {
        let dir = tmp("ctx-detail");
        let ctx = LogContext::new(&dir);
        ctx.initialize("development").unwrap();

        ctx.logger("bot")
            .error_with_detail("handler failed", "External(\"boom\")");
        let log = fs::read_to_string(dir.join("bot.log")).unwrap();
        assert!(log.contains("bot: handler failed\nExternal(\"boom\")\n"));
    }

    #[test]
    fn banner_is_written_on_initialize() {
        let dir = tmp("ctx-banner");
        let ctx = LogContext::new(&dir);
        ctx.initialize("minimal").unwrap();

        let log = fs::read_to_string(dir.join("bot.log")).unwrap();
        assert!(log.contains("logging initialized (environment: minimal)"));
        assert!(log.contains("console level: WARNING"));
        assert!(log.contains("colored console: disabled"));
    }

    #[test]
    fn unwritable_log_dir_is_fatal() {
        let file = tmp("ctx-blocked");
        fs::write(&file, "not a directory").unwrap();
        let ctx = LogContext::new(file.join("logs"));
        assert!(matches!(
            ctx.initialize("production"),
            Err(Error::Config(_))
        ));
    }
}
