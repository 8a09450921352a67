use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::{
    config::PanelConfig,
    error::{PanelError, Result},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static PANEL_LOGGER: Lazy<PanelLogger> = Lazy::new(PanelLogger::default);

pub fn init() -> Result<()> {
    init_with_config(LoggerConfig::default())
}

/// Installs the panel logger behind the `log` facade. Fails if another
/// logger was installed first.
pub fn init_with_config(config: LoggerConfig) -> Result<()> {
    log::set_logger(&*PANEL_LOGGER)
        .map_err(|e| PanelError::ConfigError(format!("Failed to set logger: {}", e)))?;

    log::set_max_level(LevelFilter::from(config.level));
    PANEL_LOGGER.configure(config);
    Ok(())
}

/// Installs the panel logger once for the whole test binary, writing plain
/// lines at every level to a fresh file. Returns that file.
#[cfg(test)]
pub(crate) fn capture_file() -> &'static std::path::Path {
    static CAPTURE: Lazy<PathBuf> = Lazy::new(|| {
        let name = format!("elongation-test-{}.log", Uuid::new_v4());
        let path = std::env::temp_dir().join(name);
        let config = LoggerConfig::new()
            .with_level(LogLevel::Trace)
            .with_colors(false)
            .with_file_output(path.clone());
        init_with_config(config).unwrap();
        path
    });
    &CAPTURE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn badge(&self) -> (&'static str, Color) {
        match self {
            LogLevel::Trace => ("🔍", Color::Cyan),
            LogLevel::Debug => ("🐛", Color::Blue),
            LogLevel::Info => ("💡", Color::Green),
            LogLevel::Warn => ("⚠️", Color::Yellow),
            LogLevel::Error => ("❌", Color::Red),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// One log line. Serialized as-is when JSON output is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level: record.level().into(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location: record
                .file()
                .zip(record.line())
                .map(|(file, line)| format!("{}:{}", file, line)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub colors: bool,
    pub emojis: bool,
    pub json: bool,
    pub show_location: bool,
    /// Extra sink; always written without ANSI colors.
    pub file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            colors: true,
            emojis: true,
            json: false,
            show_location: false,
            file: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug level with source locations, for working on the panel itself.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_location: true,
            ..Self::default()
        }
    }

    /// JSON lines to stderr and `elongation.log`, no decoration.
    pub fn production() -> Self {
        Self {
            colors: false,
            emojis: false,
            json: true,
            file: Some(PathBuf::from("elongation.log")),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn with_file_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    fn render(&self, entry: &LogEntry, colors: bool) -> String {
        if self.json {
            return serde_json::to_string(entry).unwrap_or_else(|_| entry.message.clone());
        }

        let mut line = String::new();
        let stamp = entry.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let (emoji, color) = entry.level.badge();
        let badge = if self.emojis {
            format!("{} {}", emoji, entry.level)
        } else {
            entry.level.to_string()
        };

        if colors {
            let _ = write!(
                line,
                "{} [{}] {}: {}",
                stamp.bright_black(),
                badge.color(color).bold(),
                entry.target.bright_blue(),
                entry.message
            );
        } else {
            let _ = write!(line, "{} [{}] {}: {}", stamp, badge, entry.target, entry.message);
        }

        if let Some(location) = entry.location.as_ref().filter(|_| self.show_location) {
            let _ = write!(line, " ({})", location);
        }
        line
    }
}

struct Sink {
    config: LoggerConfig,
    file: Option<File>,
}

/// Global logger behind the `log` facade. Writes to stderr so stdout stays
/// free for the rendered panel.
pub struct PanelLogger {
    sink: Mutex<Sink>,
}

impl Default for PanelLogger {
    fn default() -> Self {
        Self {
            sink: Mutex::new(Sink {
                config: LoggerConfig::default(),
                file: None,
            }),
        }
    }
}

impl PanelLogger {
    fn sink(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn configure(&self, config: LoggerConfig) {
        let file = config.file.as_ref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eprintln!("cannot open log file {}: {}", path.display(), e))
                .ok()
        });

        *self.sink() = Sink { config, file };
    }
}

impl log::Log for PanelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        LogLevel::from(metadata.level()) >= self.sink().config.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record);
        let mut sink = self.sink();
        eprintln!("{}", sink.config.render(&entry, sink.config.colors));

        let plain = sink.config.render(&entry, false);
        if let Some(file) = sink.file.as_mut() {
            let _ = writeln!(file, "{}", plain);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = self.sink().file.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Measures an operation; logs its duration once, on `stop` or drop.
pub struct Timer {
    name: String,
    start: Instant,
    stopped: bool,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            name: name.to_string(),
            start: Instant::now(),
            stopped: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn stop(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !std::mem::replace(&mut self.stopped, true) {
            log::debug!("⏱️  {} took {}ms", self.name, elapsed.as_millis());
        }
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
}

pub fn log_config_info(config: &PanelConfig) {
    let service = &config.service;
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Service: {}{}", service.base_url, service.endpoint_path);
    log::info!(
        "   Timeout: {}s, retries: {}",
        service.timeout.as_secs(),
        service.retry.max_retries
    );
    log::info!("   Download dir: {}", config.download_dir.display());
}
