//! Structured logging for the station dashboard.
//!
//! Provides context-rich logging tagged with the data source and, where it
//! applies, the vehicle key or gauge id. Supports console output and an
//! optional append-only log file for long-running `--watch` sessions.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::error::SourceError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Crew scheduling portal.
    Schedule,
    /// River gauge API.
    Gauge,
    Weather,
    /// Flat JSON documents.
    Store,
    Auth,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Schedule => write!(f, "SCHED"),
            DataSource::Gauge => write!(f, "GAUGE"),
            DataSource::Weather => write!(f, "WX"),
            DataSource::Store => write!(f, "STORE"),
            DataSource::Auth => write!(f, "AUTH"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - source deliberately not configured
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, source: DataSource, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, source, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output goes to stderr so page output on stdout stays clean
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, subject_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// One log line: `2024-05-01 13:00:00 UTC WARN GAUGE [2]: message`.
fn format_entry(level: LogLevel, source: DataSource, subject: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, source, subject_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, source: DataSource, subject: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, source, subject, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: DataSource, subject: Option<&str>, message: &str) {
    emit(LogLevel::Info, source, subject, message);
}

/// Log a warning message
pub fn warn(source: DataSource, subject: Option<&str>, message: &str) {
    emit(LogLevel::Warning, source, subject, message);
}

/// Log an error message
pub fn error(source: DataSource, subject: Option<&str>, message: &str) {
    emit(LogLevel::Error, source, subject, message);
}

/// Log a debug message
pub fn debug(source: DataSource, subject: Option<&str>, message: &str) {
    emit(LogLevel::Debug, source, subject, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a fetch failure from any external source.
pub fn classify_source_failure(err: &SourceError) -> FailureType {
    match err {
        // Running without a cookie or API key is a deployment choice
        SourceError::NotConfigured(_) => FailureType::Expected,
        // Server errors and shape changes need a human
        SourceError::HttpStatus(code) if *code >= 500 => FailureType::Unexpected,
        SourceError::Parse(_) => FailureType::Unexpected,
        // 401/403 usually means the portal cookie expired
        SourceError::HttpStatus(_) => FailureType::Unknown,
        SourceError::Timeout(_) | SourceError::Transport(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a data source failure with automatic classification
pub fn log_source_failure(source: DataSource, subject: &str, operation: &str, err: &SourceError) {
    let failure_type = classify_source_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(subject), &message),
        FailureType::Unexpected => error(source, Some(subject), &message),
        FailureType::Unknown => warn(source, Some(subject), &message),
    }
}

// ---------------------------------------------------------------------------
// Refresh Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one page refresh across several sources
pub fn log_refresh_summary(source: DataSource, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Refresh complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(source, None, &message);
    } else if successful == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}
