//! The structured application logger.
//!
//! Entries are redacted once, then fanned out to every attached sink.
//! Diagnostic logging inside the crates still goes through `tracing`; this
//! logger carries the entries the UI and backend care about.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::redact::Redactor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub fields: Value,
    pub timestamp: i64,
}

/// Destination for log entries. Entries arrive already redacted.
pub trait LogSink: Send {
    fn write(&self, entry: &LogEntry);
}

/// Forwards entries to `tracing` at the matching level.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, entry: &LogEntry) {
        let fields = entry.fields.to_string();
        match entry.level {
            LogLevel::Debug => debug!(target: "cardboard", fields = %fields, "{}", entry.message),
            LogLevel::Info => info!(target: "cardboard", fields = %fields, "{}", entry.message),
            LogLevel::Warn => warn!(target: "cardboard", fields = %fields, "{}", entry.message),
            LogLevel::Error => error!(target: "cardboard", fields = %fields, "{}", entry.message),
        }
    }
}

/// Collects entries in memory. Clones share the same buffer.
#[derive(Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

pub struct Logger {
    redactor: Redactor,
    min_level: LogLevel,
    sinks: Vec<Box<dyn LogSink>>,
}

impl Logger {
    pub fn new(redactor: Redactor) -> Self {
        Self {
            redactor,
            min_level: LogLevel::Debug,
            sinks: Vec::new(),
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>, fields: Value) {
        if level < self.min_level {
            return;
        }
        let entry = LogEntry {
            level,
            message: message.into(),
            fields: self.redactor.redact(&fields),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        for sink in &self.sinks {
            sink.write(&entry);
        }
    }

    pub fn debug(&self, message: impl Into<String>, fields: Value) {
        self.log(LogLevel::Debug, message, fields);
    }

    pub fn info(&self, message: impl Into<String>, fields: Value) {
        self.log(LogLevel::Info, message, fields);
    }

    pub fn warn(&self, message: impl Into<String>, fields: Value) {
        self.log(LogLevel::Warn, message, fields);
    }

    pub fn error(&self, message: impl Into<String>, fields: Value) {
        self.log(LogLevel::Error, message, fields);
    }
}
