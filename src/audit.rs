//! JSONL log sink for exec-gatekeeper
//!
//! stdout carries protocol frames, so every diagnostic goes to this file
//! instead. The sink is handed to whoever needs it; there is no global logger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Log level for entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Error,
}

/// One line of the log
#[derive(Debug, Serialize)]
pub struct LogEntry<'a> {
    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    /// Short machine-friendly tag (e.g. "frame", "exec", "rule")
    pub event: &'a str,

    pub message: String,
}

impl<'a> LogEntry<'a> {
    pub fn new(level: LogLevel, event: &'a str, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            event,
            message,
        }
    }
}

/// Append-only log file
pub struct HostLogger {
    writer: Option<BufWriter<File>>,
}

impl HostLogger {
    /// Open (or create) the log at `path`. A missing path or an unopenable
    /// file gives a disabled logger.
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Write one entry
    pub fn log(&mut self, entry: &LogEntry<'_>) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    pub fn trace(&mut self, event: &str, message: impl Into<String>) {
        let _ = self.log(&LogEntry::new(LogLevel::Trace, event, message.into()));
    }

    pub fn error(&mut self, event: &str, message: impl Into<String>) {
        let _ = self.log(&LogEntry::new(LogLevel::Error, event, message.into()));
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}

/// A logger that drops everything
impl Default for HostLogger {
    fn default() -> Self {
        Self { writer: None }
    }
}
