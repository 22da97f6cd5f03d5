//! Scrolling reading log
//!
//! [`ReadingLog`] keeps the most recent entries newest-first and drops the
//! oldest once it is full. Data entries hold a [`Reading`]: a decoded payload
//! split into an optional source timestamp and `key: value` fields.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use crate::export::Record;

/// Default number of entries kept by the log
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Name of the timestamp column in records
pub const TIMESTAMP_FIELD: &str = "Timestamp";

/// Payload field holding the source timestamp
pub const TS_KEY: &str = "ts";

/// Field name used for payloads that are not objects
pub const VALUE_FIELD: &str = "value";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One decoded payload
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    timestamp: Option<DateTime<Local>>,
    fields: Vec<(String, String)>,
    raw: Value,
}

impl Reading {
    /// Splits a payload into timestamp and fields
    ///
    /// For objects, `ts` (epoch milliseconds or an RFC 3339 string) becomes
    /// the timestamp and the other keys become fields in payload order. A
    /// `ts` that cannot be interpreted is kept as an ordinary field. Any
    /// other payload becomes a single `value` field.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let mut timestamp = None;
        let mut fields = Vec::new();

        if let Value::Object(map) = &raw {
            for (key, value) in map {
                if key == TS_KEY
                    && timestamp.is_none()
                    && let Some(parsed) = parse_timestamp(value)
                {
                    timestamp = Some(parsed);
                    continue;
                }
                fields.push((key.clone(), value_text(value)));
            }
        } else {
            fields.push((VALUE_FIELD.to_string(), value_text(&raw)));
        }

        Self {
            timestamp,
            fields,
            raw,
        }
    }

    /// Source timestamp, if the payload carried one
    #[must_use]
    pub const fn timestamp(&self) -> Option<&DateTime<Local>> {
        self.timestamp.as_ref()
    }

    /// Timestamp as shown to the user, `N/A` when absent
    #[must_use]
    pub fn timestamp_text(&self) -> String {
        self.timestamp.map_or_else(
            || "N/A".to_string(),
            |ts| ts.format(TIME_FORMAT).to_string(),
        )
    }

    /// Fields other than the timestamp, in payload order
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The payload as received
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Field list with the timestamp first
    #[must_use]
    pub fn record(&self) -> Record {
        std::iter::once((TIMESTAMP_FIELD.to_string(), self.timestamp_text()))
            .chain(self.fields.iter().cloned())
            .collect()
    }

    /// Single-line rendering used for display and filtering
    #[must_use]
    pub fn display_text(&self) -> String {
        self.record()
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Local>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Local.timestamp_millis_opt(millis).single()
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Local)),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Kind of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Status message from the application
    System,
    /// Error reported by the connection
    Error,
    /// Decoded reading
    Data,
}

impl EntryKind {
    /// Short label for terminal output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Error => "error",
            Self::Data => "data",
        }
    }
}

/// One line of the log, stamped with its local receive time
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// Status message
    System {
        /// Receive time
        at: DateTime<Local>,
        /// Message text
        text: String,
    },
    /// Error message
    Error {
        /// Receive time
        at: DateTime<Local>,
        /// Message text
        text: String,
    },
    /// Reading
    Data {
        /// Receive time
        at: DateTime<Local>,
        /// Decoded payload
        reading: Reading,
    },
}

impl LogEntry {
    /// When the entry was recorded
    #[must_use]
    pub const fn at(&self) -> &DateTime<Local> {
        match self {
            Self::System { at, .. } | Self::Error { at, .. } | Self::Data { at, .. } => at,
        }
    }

    /// Entry kind
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::System { .. } => EntryKind::System,
            Self::Error { .. } => EntryKind::Error,
            Self::Data { .. } => EntryKind::Data,
        }
    }

    /// The reading, for data entries
    #[must_use]
    pub const fn reading(&self) -> Option<&Reading> {
        match self {
            Self::Data { reading, .. } => Some(reading),
            _ => None,
        }
    }

    /// Text shown for the entry
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::System { text, .. } | Self::Error { text, .. } => text.clone(),
            Self::Data { reading, .. } => reading.display_text(),
        }
    }

    /// Case-insensitive substring match on the display text
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        filter.is_empty()
            || self
                .display_text()
                .to_lowercase()
                .contains(&filter.to_lowercase())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<6} {}",
            self.at().format("%H:%M:%S"),
            self.kind().label(),
            self.display_text()
        )
    }
}

/// Bounded newest-first log
#[derive(Debug, Clone)]
pub struct ReadingLog {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl Default for ReadingLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl ReadingLog {
    /// Creates a log holding at most `max_entries` (minimum 1)
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Maximum number of entries kept
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Adds an entry at the front, dropping the oldest beyond capacity
    pub fn push(&mut self, entry: LogEntry) -> &LogEntry {
        self.entries.push_front(entry);
        self.entries.truncate(self.max_entries);
        &self.entries[0]
    }

    /// Adds a status message
    pub fn push_system(&mut self, text: impl Into<String>) -> &LogEntry {
        self.push(LogEntry::System {
            at: Local::now(),
            text: text.into(),
        })
    }

    /// Adds an error message
    pub fn push_error(&mut self, text: impl Into<String>) -> &LogEntry {
        self.push(LogEntry::Error {
            at: Local::now(),
            text: text.into(),
        })
    }

    /// Adds a reading
    pub fn push_reading(&mut self, reading: Reading) -> &LogEntry {
        self.push(LogEntry::Data {
            at: Local::now(),
            reading,
        })
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Newest entry
    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose text contains `text`, ignoring case, newest first
    #[must_use]
    pub fn filter(&self, text: &str) -> Vec<&LogEntry> {
        let needle = text.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&needle)).collect()
    }

    /// Data entries as records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.entries
            .iter()
            .rev()
            .filter_map(LogEntry::reading)
            .map(Reading::record)
            .collect()
    }
}
