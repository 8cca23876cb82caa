use crate::clash::{prefix_field_clashes, FieldMap, ReservedKeys};
use crate::event::LogEvent;
use crate::formatter::{format_timestamp, resolve_timestamp_format, BuildError, FormatError, Formatter};
use crate::sink::TerminalProbe;
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashMap;

/// Options for the machine-readable formatter: one JSON object per line.
///
/// ```
/// use tracing_log_format::clash::{FieldKey, FieldMap};
/// use tracing_log_format::json::JsonFormatterOptions;
///
/// let formatter = JsonFormatterOptions {
///     field_map: FieldMap::new()
///         .with(FieldKey::Time, "@timestamp")
///         .with(FieldKey::Level, "@level")
///         .with(FieldKey::Msg, "@message"),
///     ..Default::default()
/// }
/// .build(&false)
/// .unwrap();
/// assert_eq!(formatter.keys().time, "@timestamp");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonFormatterOptions {
    /// chrono strftime layout for the time field. Defaults to
    /// [`DEFAULT_TIMESTAMP_FORMAT`](crate::formatter::DEFAULT_TIMESTAMP_FORMAT).
    pub timestamp_format: Option<String>,
    /// Leave the time field out of the output entirely.
    pub disable_timestamp: bool,
    /// Renames for the time, level and msg keys.
    pub field_map: FieldMap,
}

impl JsonFormatterOptions {
    /// Resolve the options into a [`JsonFormatter`].
    ///
    /// The output sink is accepted for symmetry with the text formatter
    /// but is never inspected.
    pub fn build(self, _out: &dyn TerminalProbe) -> Result<JsonFormatter, BuildError> {
        let keys = ReservedKeys::resolve(&self.field_map);
        let timestamp_format = if self.disable_timestamp {
            None
        } else {
            Some(resolve_timestamp_format(self.timestamp_format.as_deref())?)
        };

        tracing::debug!(
            time_key = %keys.time,
            level_key = %keys.level,
            msg_key = %keys.msg,
            timestamp_format = ?timestamp_format,
            "built json formatter"
        );

        Ok(JsonFormatter {
            timestamp_format,
            keys,
        })
    }
}

/// Built machine-readable formatter. See [`JsonFormatterOptions`].
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// `None` when the time field is not emitted.
    timestamp_format: Option<String>,
    keys: ReservedKeys,
}

impl JsonFormatter {
    /// Resolved names of the reserved fields.
    pub fn keys(&self) -> &ReservedKeys {
        &self.keys
    }

    /// Resolved timestamp layout, or `None` if the time field is disabled.
    pub fn timestamp_format(&self) -> Option<&str> {
        self.timestamp_format.as_deref()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, event: &mut LogEvent) -> Result<Vec<u8>, FormatError> {
        let mut data: HashMap<String, Value> = HashMap::with_capacity(event.fields.len() + 3);
        // Error values serialize as their description; a failing Display
        // surfaces as a serialization error rather than a panic.
        for (key, value) in &event.fields {
            data.insert(key.clone(), value.clone());
        }
        prefix_field_clashes(&mut data, &self.keys);

        if let Some(layout) = &self.timestamp_format {
            data.insert(
                self.keys.time.clone(),
                Value::Str(format_timestamp(&event.time, layout)),
            );
        }
        data.insert(self.keys.msg.clone(), Value::Str(event.message.clone()));
        data.insert(
            self.keys.level.clone(),
            Value::Str(event.level.as_str().to_string()),
        );

        let mut serialized = serde_json::to_vec(&data)?;
        serialized.push(b'\n');
        Ok(serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clash::FieldKey;
    use crate::level::Level;
    use chrono::{TimeZone, Utc};
    use std::fmt;
    use std::io;

    fn decode(bytes: &[u8]) -> serde_json::Map<String, serde_json::Value> {
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 1);
        match serde_json::from_slice(bytes).unwrap() {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    fn event() -> LogEvent {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        LogEvent::at(t, Level::Info, "hello").with_field("user", "alice")
    }

    #[test]
    fn writes_reserved_fields_and_attributes() {
        let f = JsonFormatterOptions::default().build(&false).unwrap();
        let out = decode(&f.format(&mut event()).unwrap());

        assert_eq!(out.len(), 4);
        assert_eq!(out["time"], "2024-01-02T15:04:05Z");
        assert_eq!(out["level"], "info");
        assert_eq!(out["msg"], "hello");
        assert_eq!(out["user"], "alice");
    }

    #[test]
    fn disabled_timestamp_omits_time_key() {
        let f = JsonFormatterOptions {
            disable_timestamp: true,
            timestamp_format: Some("%!bogus".to_string()),
            ..Default::default()
        }
        .build(&false)
        .unwrap();
        assert_eq!(f.timestamp_format(), None);

        let out = decode(&f.format(&mut event()).unwrap());
        assert!(!out.contains_key("time"));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn renamed_keys_are_used() {
        let f = JsonFormatterOptions {
            field_map: FieldMap::new()
                .with(FieldKey::Time, "@timestamp")
                .with(FieldKey::Level, "@level")
                .with(FieldKey::Msg, "@message"),
            ..Default::default()
        }
        .build(&false)
        .unwrap();
        let mut e = event().with_field("@level", "user-level");
        let out = decode(&f.format(&mut e).unwrap());

        assert_eq!(out["@timestamp"], "2024-01-02T15:04:05Z");
        assert_eq!(out["@level"], "info");
        assert_eq!(out["@message"], "hello");
        assert_eq!(out["fields.@level"], "user-level");
        assert!(!out.contains_key("time"));
    }

    #[test]
    fn clashing_attributes_are_prefixed() {
        let f = JsonFormatterOptions::default().build(&false).unwrap();
        let mut e = event()
            .with_field("time", "yesterday")
            .with_field("msg", 7)
            .with_field("level", true);
        let out = decode(&f.format(&mut e).unwrap());

        assert_eq!(out["time"], "2024-01-02T15:04:05Z");
        assert_eq!(out["fields.time"], "yesterday");
        assert_eq!(out["fields.msg"], 7);
        assert_eq!(out["fields.level"], true);
    }

    #[test]
    fn errors_become_their_description() {
        let f = JsonFormatterOptions::default().build(&false).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let mut e = LogEvent::at(t, Level::Error, "")
            .with_field("err", Value::error(io::Error::new(io::ErrorKind::Other, "disk full")));
        let out = decode(&f.format(&mut e).unwrap());

        assert_eq!(out["level"], "error");
        assert_eq!(out["msg"], "");
        assert_eq!(out["err"], "disk full");
        assert!(out.contains_key("time"));
    }

    #[test]
    fn unrepresentable_value_is_a_serialization_error() {
        struct Broken;
        impl fmt::Display for Broken {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let f = JsonFormatterOptions::default().build(&false).unwrap();
        let mut e = event().with_field("broken", Value::display(Broken));
        let err = f.format(&mut e).unwrap_err();
        assert!(matches!(err, FormatError::Serialization(_)));
    }

    #[test]
    fn error_with_failing_display_is_a_serialization_error() {
        #[derive(Debug)]
        struct BrokenErr;
        impl fmt::Display for BrokenErr {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        impl std::error::Error for BrokenErr {}

        let f = JsonFormatterOptions::default().build(&false).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let mut e = LogEvent::at(t, Level::Error, "x").with_field("err", Value::error(BrokenErr));
        let err = f.format(&mut e).unwrap_err();
        assert!(matches!(err, FormatError::Serialization(_)));
    }

    #[test]
    fn invalid_layout_fails_build() {
        let err = JsonFormatterOptions {
            timestamp_format: Some("%!".to_string()),
            ..Default::default()
        }
        .build(&false)
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidTimestampFormat(_)));
    }
}
