//! Error Channel Abstraction
//!
//! The sync engine reports every non-fatal failure (a folder listing that ran
//! out of retries, an item that failed to download) to a single sink instead
//! of raising it to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Component that emitted the entry
    pub target: String,
    /// Log message
    pub message: String,
    /// Structured fields, ordered by key
    pub fields: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn error(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, target, message)
    }

    pub fn warn(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, target, message)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Single-line rendering used by text sinks
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{} [{}] {}: {}",
            self.timestamp.to_rfc3339(),
            self.level,
            self.target,
            self.message
        );
        for (key, value) in &self.fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        line
    }
}

/// Logger sink trait
///
/// Receives one self-contained entry per failure. Entries emitted from
/// concurrent download tasks may arrive in any order, so each entry must carry
/// enough fields (item id, folder, page) to be understood on its own.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::sink::{LoggerSink, LogEntry};
///
/// async fn report(sink: &dyn LoggerSink, item_id: &str, error: &str) {
///     let entry = LogEntry::error("sync", error).with_field("item_id", item_id);
///     sink.log(entry).await.ok();
/// }
/// ```
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    /// Record an entry
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered entries
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Minimum level this sink records
    fn min_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Debug > LogLevel::Trace);
    }

    #[test]
    fn test_entry_line_contains_fields_in_key_order() {
        let entry = LogEntry::error("sync", "Failed to download item")
            .with_field("item_id", "abc")
            .with_field("folder", "Sketches");

        let line = entry.to_line();
        assert!(line.contains("[ERROR] sync: Failed to download item"));
        assert!(line.ends_with(" folder=Sketches item_id=abc"));
    }
}
