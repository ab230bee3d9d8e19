//! Invocation logger and internal diagnostics
//!
//! Two layers share this module:
//!
//! - [`Logger`] is the user-facing log for one invocation. Its level, color
//!   and targets come from [`resolve_log_settings`].
//! - [`init_tracing`] installs the process-wide `tracing` subscriber used by
//!   the core's own `debug!`/`warn!` diagnostics, filtered by `BOOTKIT_LOG`.

use crate::config::LoggingConfig;
use crate::error::{BootstrapError, Result};
use crate::flags::{ColorPolicy, CommonFlags};
use chrono::{Local, SecondsFormat};
use crossterm::style::{Color, Stylize};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the internal diagnostics level.
pub const DIAGNOSTICS_ENV: &str = "BOOTKIT_LOG";

/// Log severity, least to most verbose.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Error => Color::DarkRed,
            Self::Warn => Color::DarkYellow,
            Self::Info => Color::DarkCyan,
            Self::Debug => Color::DarkMagenta,
            Self::Trace => Color::DarkBlue,
        }
    }
}

impl From<String> for LogLevel {
    fn from(value: String) -> Self {
        Self::from_name(&value).unwrap_or_else(|| {
            tracing::warn!(level = %value, "unknown log level, using info");
            Self::Info
        })
    }
}

// `from = "String"` would derive a bare string schema; list the names.
impl JsonSchema for LogLevel {
    fn schema_name() -> Cow<'static, str> {
        "LogLevel".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        let names: Vec<&str> = Self::ALL.iter().map(|level| level.as_str()).collect();
        json_schema!({
            "type": "string",
            "enum": names
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "path")]
pub enum LogTarget {
    Stderr,
    Discard,
    File(PathBuf),
}

/// Derived logger configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    pub level: LogLevel,
    /// Prefix each line with an RFC 3339 timestamp
    pub diagnostics: bool,
    pub colorize: bool,
    pub targets: Vec<LogTarget>,
}

/// Effective level after flags.
///
/// `trace` > `debug` > `-vv` > `-v` > `quiet` > configured level. Quiet only
/// clamps toward `error`; it never makes the log more verbose.
pub fn effective_level(flags: &CommonFlags, configured: LogLevel) -> LogLevel {
    if flags.trace {
        LogLevel::Trace
    } else if flags.debug {
        LogLevel::Debug
    } else if flags.verbose >= 2 {
        LogLevel::Trace
    } else if flags.verbose == 1 {
        LogLevel::Debug
    } else if flags.quiet {
        configured.min(LogLevel::Error)
    } else {
        configured
    }
}

/// Derive [`LogSettings`] from flags and the `[logging]` section.
///
/// Pure: the log file is only opened by [`Logger::open`].
pub fn resolve_log_settings(flags: &CommonFlags, logging: &LoggingConfig) -> LogSettings {
    let mut targets = if flags.quiet {
        vec![LogTarget::Discard]
    } else {
        vec![LogTarget::Stderr]
    };

    let file = logging.file.as_deref().filter(|f| !f.is_empty());
    if let Some(file) = file.filter(|_| !flags.dry_run) {
        let target = LogTarget::File(PathBuf::from(file));
        if flags.quiet {
            targets = vec![target];
        } else {
            targets.push(target);
        }
    }

    LogSettings {
        level: effective_level(flags, logging.level),
        diagnostics: flags.diagnostics,
        colorize: should_colorize(flags.color_policy(), targets.first()),
        targets,
    }
}

/// Whether lines should carry ANSI color for `policy` and the primary target.
pub fn should_colorize(policy: ColorPolicy, primary: Option<&LogTarget>) -> bool {
    match policy {
        ColorPolicy::Always => true,
        ColorPolicy::Never => false,
        ColorPolicy::Auto => {
            matches!(primary, Some(LogTarget::Stderr)) && io::stderr().is_terminal()
        }
    }
}

enum Sink {
    Stderr,
    File(File),
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self {
            Self::Stderr => io::stderr().lock().write_all(line.as_bytes()),
            Self::File(file) => file.write_all(line.as_bytes()),
            Self::Writer(writer) => {
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr => io::stderr().flush(),
            Self::File(file) => file.flush(),
            Self::Writer(writer) => writer.flush(),
        }
    }
}

struct LoggerInner {
    level: LogLevel,
    diagnostics: bool,
    colorize: bool,
    sinks: Mutex<Vec<Sink>>,
}

/// Leveled logger writing to every configured target.
///
/// Cheap to clone; clones share targets. One mutex guards all targets so
/// lines from concurrent threads never interleave.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.inner.level)
            .field("diagnostics", &self.inner.diagnostics)
            .field("colorize", &self.inner.colorize)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Build a logger for `settings`, opening any file target for append.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::LogFileOpenFailed`] if a file target cannot
    /// be opened or created.
    pub fn open(settings: &LogSettings) -> Result<Self> {
        let mut sinks = Vec::with_capacity(settings.targets.len());
        for target in &settings.targets {
            match target {
                LogTarget::Stderr => sinks.push(Sink::Stderr),
                LogTarget::Discard => {}
                LogTarget::File(path) => {
                    let file = open_append(path).map_err(|source| {
                        BootstrapError::LogFileOpenFailed {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    sinks.push(Sink::File(file));
                }
            }
        }
        Ok(Self::from_sinks(settings, sinks))
    }

    /// Logger writing to an arbitrary writer instead of the settings' targets.
    pub fn with_writer<W>(settings: &LogSettings, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::from_sinks(settings, vec![Sink::Writer(Box::new(writer))])
    }

    fn from_sinks(settings: &LogSettings, sinks: Vec<Sink>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                level: settings.level,
                diagnostics: settings.diagnostics,
                colorize: settings.colorize,
                sinks: Mutex::new(sinks),
            }),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.inner.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.inner.level
    }

    /// Write `message` at `level` to every target if the level allows it.
    ///
    /// Write errors are dropped; logging never fails the caller.
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }

        let mut sinks = self.lock_sinks();
        let line = self.format_line(level, &message);
        for sink in sinks.iter_mut() {
            let _ = sink.write_line(&line);
        }
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    /// Flush every target and release file handles.
    ///
    /// Idempotent. Non-file targets keep working afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first flush error; every handle is released regardless.
    pub fn close(&self) -> io::Result<()> {
        let mut sinks = self.lock_sinks();
        let mut result = Ok(());
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        sinks.retain(|sink| !matches!(sink, Sink::File(_)));
        result
    }

    fn lock_sinks(&self) -> MutexGuard<'_, Vec<Sink>> {
        self.inner
            .sinks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn format_line(&self, level: LogLevel, message: &dyn fmt::Display) -> String {
        let label = level.label();
        let pad = " ".repeat(5 - label.len());
        let label = if self.inner.colorize {
            label.with(level.color()).to_string()
        } else {
            label.to_string()
        };

        if self.inner.diagnostics {
            let ts = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
            format!("[{ts}] {label}{pad} {message}\n")
        } else {
            format!("{label}{pad} {message}\n")
        }
    }
}

fn open_append(path: &std::path::Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Filter for internal diagnostics: `BOOTKIT_LOG` directives such as
/// `debug` or `bootkit_core::config=trace,warn`, else `warn`.
fn diagnostics_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Install the process-wide `tracing` subscriber from `BOOTKIT_LOG`.
///
/// Safe to call more than once; only the first call does anything, and a
/// subscriber installed elsewhere is left in place.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }
    let directives = std::env::var(DIAGNOSTICS_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(diagnostics_filter(directives.as_deref()))
        .with_writer(io::stderr)
        .try_init();
    let _ = TRACING_INIT.set(());
}
