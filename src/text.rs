use crate::clash::{prefix_field_clashes, ReservedKeys};
use crate::event::LogEvent;
use crate::formatter::{format_timestamp, resolve_timestamp_format, BuildError, FormatError, Formatter};
use crate::level::Level;
use crate::sink::{platform_supports_color, TerminalProbe};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Initial capacity of a freshly allocated output buffer.
const INITIAL_BUFFER_CAPACITY: usize = 200;

/// Minimum width the message is padded to on colored lines.
const MESSAGE_WIDTH: usize = 44;

const DEFAULT_QUOTE: &str = "\"";

/// ANSI foreground colors used for the level badge and attribute keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Color {
    Red = 31,
    Yellow = 33,
    Blue = 34,
    Gray = 37,
}

impl Color {
    fn for_level(level: Level) -> Self {
        match level {
            Level::Debug => Color::Gray,
            Level::Warning => Color::Yellow,
            Level::Error | Level::Fatal | Level::Panic => Color::Red,
            _ => Color::Blue,
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

/// Options for the human-readable `key=value` formatter.
///
/// When the sink is a terminal (or `force_colors` is set) lines are
/// rendered as a colored level badge, an optional timestamp, the padded
/// message and then the attributes. Otherwise every part is written as a
/// plain `key=value` pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextFormatterOptions {
    /// Emit colors even when the sink is not a terminal.
    pub force_colors: bool,
    /// Never emit colors. Wins over `force_colors`.
    pub disable_colors: bool,
    /// Leave timestamps out, e.g. when the log collector adds its own.
    pub disable_timestamp: bool,
    /// On colored lines, print the formatted timestamp instead of the
    /// seconds elapsed since the formatter was built.
    pub full_timestamp: bool,
    /// chrono strftime layout for timestamps. Defaults to
    /// [`DEFAULT_TIMESTAMP_FORMAT`](crate::formatter::DEFAULT_TIMESTAMP_FORMAT).
    pub timestamp_format: Option<String>,
    /// Keep the map's own attribute order instead of sorting keys.
    pub disable_sorting: bool,
    /// Quote empty values.
    pub quote_empty_fields: bool,
    /// Quote used around values that need it. Defaults to `"`.
    pub quote_character: Option<String>,
}

impl TextFormatterOptions {
    /// Resolve the options into a [`TextFormatter`].
    ///
    /// `out` is asked once whether it is a terminal; the answer decides
    /// for the lifetime of the formatter whether colors are used.
    pub fn build(self, out: &dyn TerminalProbe) -> Result<TextFormatter, BuildError> {
        let timestamp_format = if self.disable_timestamp {
            None
        } else {
            Some(resolve_timestamp_format(self.timestamp_format.as_deref())?)
        };

        let quote = match self.quote_character {
            Some(q) if !q.is_empty() => q,
            _ => DEFAULT_QUOTE.to_string(),
        };

        let is_color_terminal = out.is_terminal() && platform_supports_color();
        let colored = (self.force_colors || is_color_terminal) && !self.disable_colors;

        tracing::debug!(
            colored,
            timestamp_format = ?timestamp_format,
            full_timestamp = self.full_timestamp,
            sorted = !self.disable_sorting,
            "built text formatter"
        );

        Ok(TextFormatter {
            timestamp_format,
            full_timestamp: self.full_timestamp,
            disable_sorting: self.disable_sorting,
            quote_empty_fields: self.quote_empty_fields,
            quote,
            colored,
            keys: ReservedKeys::default(),
            base_time: Utc::now(),
        })
    }
}

/// Built human-readable formatter. See [`TextFormatterOptions`].
#[derive(Debug, Clone)]
pub struct TextFormatter {
    /// `None` when timestamps are disabled.
    timestamp_format: Option<String>,
    full_timestamp: bool,
    disable_sorting: bool,
    quote_empty_fields: bool,
    quote: String,
    colored: bool,
    keys: ReservedKeys,
    /// Reference point for the elapsed-seconds column.
    base_time: DateTime<Utc>,
}

impl TextFormatter {
    /// Whether lines are rendered with terminal escape codes.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    /// Time the formatter was built.
    pub fn base_time(&self) -> DateTime<Utc> {
        self.base_time
    }

    fn needs_quoting(&self, text: &str) -> bool {
        if self.quote_empty_fields && text.is_empty() {
            return true;
        }
        !text
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '.')
    }

    fn append_text(&self, buf: &mut Vec<u8>, text: &str) {
        if self.needs_quoting(text) {
            buf.extend_from_slice(self.quote.as_bytes());
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(self.quote.as_bytes());
        } else {
            buf.extend_from_slice(text.as_bytes());
        }
    }

    fn append_value(&self, buf: &mut Vec<u8>, value: &Value) -> io::Result<()> {
        match value {
            Value::Str(s) => self.append_text(buf, s),
            Value::Error(err) => {
                let mut text = String::new();
                let _ = write!(text, "{}", err);
                self.append_text(buf, &text);
            }
            other => write!(buf, "{}", other)?,
        }
        Ok(())
    }

    /// Pairs are separated by a single space.
    fn append_key_text(&self, buf: &mut Vec<u8>, key: &str, text: &str) {
        if !buf.is_empty() {
            buf.push(b' ');
        }
        buf.extend_from_slice(key.as_bytes());
        buf.push(b'=');
        self.append_text(buf, text);
    }

    fn append_key_value(&self, buf: &mut Vec<u8>, key: &str, value: &Value) -> io::Result<()> {
        if !buf.is_empty() {
            buf.push(b' ');
        }
        buf.extend_from_slice(key.as_bytes());
        buf.push(b'=');
        self.append_value(buf, value)
    }

    fn write_plain(&self, buf: &mut Vec<u8>, event: &LogEvent, keys: &[&String]) -> io::Result<()> {
        if let Some(layout) = &self.timestamp_format {
            self.append_key_text(buf, &self.keys.time, &format_timestamp(&event.time, layout));
        }
        self.append_key_text(buf, &self.keys.level, event.level.as_str());
        if !event.message.is_empty() {
            self.append_key_text(buf, &self.keys.msg, &event.message);
        }
        for key in keys {
            self.append_key_value(buf, key, &event.fields[key.as_str()])?;
        }
        Ok(())
    }

    fn write_colored(&self, buf: &mut Vec<u8>, event: &LogEvent, keys: &[&String]) -> io::Result<()> {
        let color = Color::for_level(event.level).code();
        let badge = event.level.abbreviation();

        match &self.timestamp_format {
            None => write!(
                buf,
                "\x1b[{}m{}\x1b[0m {:<width$}",
                color,
                badge,
                event.message,
                width = MESSAGE_WIDTH
            )?,
            Some(layout) if self.full_timestamp => write!(
                buf,
                "\x1b[{}m{}\x1b[0m[{}] {:<width$}",
                color,
                badge,
                format_timestamp(&event.time, layout),
                event.message,
                width = MESSAGE_WIDTH
            )?,
            Some(_) => write!(
                buf,
                "\x1b[{}m{}\x1b[0m[{:04}] {:<width$}",
                color,
                badge,
                (event.time - self.base_time).num_seconds(),
                event.message,
                width = MESSAGE_WIDTH
            )?,
        }

        for key in keys {
            write!(buf, " \x1b[{}m{}\x1b[0m=", color, key)?;
            self.append_value(buf, &event.fields[key.as_str()])?;
        }
        Ok(())
    }
}

impl Formatter for TextFormatter {
    fn format(&self, event: &mut LogEvent) -> Result<Vec<u8>, FormatError> {
        prefix_field_clashes(&mut event.fields, &self.keys);

        let mut buf = event
            .buffer
            .take()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_BUFFER_CAPACITY));
        buf.clear();

        let mut keys: Vec<&String> = event.fields.keys().collect();
        if !self.disable_sorting {
            keys.sort_unstable();
        }

        // Writing into a Vec only fails when a value's Display impl does;
        // whatever was rendered up to that point is kept.
        let _ = if self.colored {
            self.write_colored(&mut buf, event, &keys)
        } else {
            self.write_plain(&mut buf, event, &keys)
        };

        buf.push(b'\n');
        Ok(buf)
    }
}
