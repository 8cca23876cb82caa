use crate::event::LogEvent;
use crate::json::JsonFormatterOptions;
use crate::sink::TerminalProbe;
use crate::text::TextFormatterOptions;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

/// Layout used when timestamps are enabled and none was configured.
/// RFC 3339 for UTC times, e.g. `2024-01-02T15:04:05Z`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Renders one [`LogEvent`] into bytes for a stream sink.
///
/// Built formatters hold no mutable state, so a single instance may be
/// shared between threads and called concurrently.
pub trait Formatter: Send + Sync {
    /// Format `event`.
    ///
    /// **Parameters**
    /// - `event`: the event to render. Its attribute set may be rewritten
    ///   by field-clash resolution, and an attached `buffer` is consumed.
    ///
    /// **Returns**
    /// - `Ok(bytes)` holding exactly one record terminated by `\n`.
    /// - `Err(..)` if the event could not be encoded. No partial output
    ///   is returned in that case.
    fn format(&self, event: &mut LogEvent) -> Result<Vec<u8>, FormatError>;
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, event: &mut LogEvent) -> Result<Vec<u8>, FormatError> {
        (**self).format(event)
    }
}

impl<F: Formatter + ?Sized> Formatter for Arc<F> {
    fn format(&self, event: &mut LogEvent) -> Result<Vec<u8>, FormatError> {
        (**self).format(event)
    }
}

/// Error type returned when formatting a single event.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to marshal fields to JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type returned when building a formatter from its options.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid timestamp format {0:?}")]
    InvalidTimestampFormat(String),
}

/// Formatter selection, resolved once at setup time.
///
/// Deserializes from an externally tagged map, e.g.
/// `{"json": {"disable_timestamp": true}}` or `{"text": {}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterOptions {
    Json(JsonFormatterOptions),
    Text(TextFormatterOptions),
}

impl Default for FormatterOptions {
    fn default() -> Self {
        FormatterOptions::Text(TextFormatterOptions::default())
    }
}

impl FormatterOptions {
    /// Build the selected formatter. `out` is probed at most once.
    pub fn build(self, out: &dyn TerminalProbe) -> Result<Box<dyn Formatter>, BuildError> {
        match self {
            FormatterOptions::Json(opts) => Ok(Box::new(opts.build(out)?)),
            FormatterOptions::Text(opts) => Ok(Box::new(opts.build(out)?)),
        }
    }
}

/// Pick the configured layout (or the default) and check that chrono
/// understands every specifier in it.
pub(crate) fn resolve_timestamp_format(layout: Option<&str>) -> Result<String, BuildError> {
    let layout = match layout {
        Some(l) if !l.is_empty() => l,
        _ => DEFAULT_TIMESTAMP_FORMAT,
    };
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(BuildError::InvalidTimestampFormat(layout.to_string()));
    }
    Ok(layout.to_string())
}

/// Render `time` with a layout already checked by
/// [`resolve_timestamp_format`].
pub(crate) fn format_timestamp(time: &DateTime<Utc>, layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() + 16);
    let _ = write!(out, "{}", time.format(layout));
    out
}
