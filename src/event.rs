use crate::level::Level;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Attribute mapping of an event. Iteration order carries no meaning.
pub type Fields = HashMap<String, Value>;

/// One log occurrence handed to a [`Formatter`](crate::formatter::Formatter).
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: Fields,
    /// Optional reusable output buffer. A formatter that renders into a
    /// buffer takes it, clears it and hands it back as its output.
    pub buffer: Option<Vec<u8>>,
}

impl LogEvent {
    /// Create an event stamped with the current time and no attributes.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }

    /// Create an event at a fixed point in time.
    pub fn at(time: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        LogEvent {
            time,
            level,
            message: message.into(),
            fields: Fields::new(),
            buffer: None,
        }
    }

    /// Builder-style attribute insertion. A repeated key replaces the
    /// earlier value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach a buffer for the formatter to render into.
    pub fn with_buffer(mut self, buffer: Vec<u8>) -> Self {
        self.buffer = Some(buffer);
        self
    }
}
