//! Environment variable names used by this crate for configuring the
//! formatters from a service's environment.
//!
//! These are purely helpers; the formatter types remain decoupled from
//! environment access.

use crate::clash::{FieldKey, FieldMap};
use crate::formatter::FormatterOptions;
use crate::init::LoggingConfig;
use crate::json::JsonFormatterOptions;
use crate::text::TextFormatterOptions;
use tracing_subscriber::filter::LevelFilter;

/// Formatter kind: `json` or `text` (default).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Most verbose level written, e.g. `debug` or `warn`. Defaults to `info`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// chrono strftime layout for timestamps.
pub const LOG_TIMESTAMP_FORMAT_ENV: &str = "LOG_TIMESTAMP_FORMAT";

pub const LOG_DISABLE_TIMESTAMP_ENV: &str = "LOG_DISABLE_TIMESTAMP";

/// Text formatter: full timestamp instead of elapsed seconds on colored lines.
pub const LOG_FULL_TIMESTAMP_ENV: &str = "LOG_FULL_TIMESTAMP";

pub const LOG_FORCE_COLORS_ENV: &str = "LOG_FORCE_COLORS";

pub const LOG_DISABLE_COLORS_ENV: &str = "LOG_DISABLE_COLORS";

pub const LOG_DISABLE_SORTING_ENV: &str = "LOG_DISABLE_SORTING";

pub const LOG_QUOTE_EMPTY_FIELDS_ENV: &str = "LOG_QUOTE_EMPTY_FIELDS";

pub const LOG_QUOTE_CHARACTER_ENV: &str = "LOG_QUOTE_CHARACTER";

/// JSON formatter: output name of the time field.
pub const LOG_FIELD_KEY_TIME_ENV: &str = "LOG_FIELD_KEY_TIME";

/// JSON formatter: output name of the level field.
pub const LOG_FIELD_KEY_LEVEL_ENV: &str = "LOG_FIELD_KEY_LEVEL";

/// JSON formatter: output name of the message field.
pub const LOG_FIELD_KEY_MSG_ENV: &str = "LOG_FIELD_KEY_MSG";

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl FormatterOptions {
    /// Options from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Options from an arbitrary variable lookup. Unset variables keep
    /// their defaults; an unknown `LOG_FORMAT` selects the text formatter.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| parse_flag(&v)).unwrap_or(false);
        let timestamp_format = lookup(LOG_TIMESTAMP_FORMAT_ENV);
        let disable_timestamp = flag(LOG_DISABLE_TIMESTAMP_ENV);

        let format = lookup(LOG_FORMAT_ENV).unwrap_or_default();
        if format.trim().eq_ignore_ascii_case("json") {
            let mut field_map = FieldMap::new();
            for (key, var) in [
                (FieldKey::Time, LOG_FIELD_KEY_TIME_ENV),
                (FieldKey::Level, LOG_FIELD_KEY_LEVEL_ENV),
                (FieldKey::Msg, LOG_FIELD_KEY_MSG_ENV),
            ] {
                if let Some(name) = lookup(var) {
                    field_map.insert(key, name);
                }
            }
            FormatterOptions::Json(JsonFormatterOptions {
                timestamp_format,
                disable_timestamp,
                field_map,
            })
        } else {
            FormatterOptions::Text(TextFormatterOptions {
                force_colors: flag(LOG_FORCE_COLORS_ENV),
                disable_colors: flag(LOG_DISABLE_COLORS_ENV),
                disable_timestamp,
                full_timestamp: flag(LOG_FULL_TIMESTAMP_ENV),
                timestamp_format,
                disable_sorting: flag(LOG_DISABLE_SORTING_ENV),
                quote_empty_fields: flag(LOG_QUOTE_EMPTY_FIELDS_ENV),
                quote_character: lookup(LOG_QUOTE_CHARACTER_ENV),
            })
        }
    }
}

impl LoggingConfig {
    /// Config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Config from an arbitrary variable lookup. An unparsable
    /// `LOG_LEVEL` keeps the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LoggingConfig {
            formatter: FormatterOptions::from_lookup(&lookup),
            ..Default::default()
        };
        if let Some(level) = lookup(LOG_LEVEL_ENV).and_then(|v| v.parse::<LevelFilter>().ok()) {
            config.max_level = level;
        }
        config
    }
}
