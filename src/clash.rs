//! Reserved output keys and the rule that keeps user attributes from
//! overwriting them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix given to a user attribute whose key equals a reserved key.
pub const CLASH_PREFIX: &str = "fields.";

/// The three fields every formatter writes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Time,
    Level,
    Msg,
}

impl FieldKey {
    /// Output name used when the key is not remapped.
    pub fn default_name(&self) -> &'static str {
        match self {
            FieldKey::Time => "time",
            FieldKey::Level => "level",
            FieldKey::Msg => "msg",
        }
    }
}

/// Rename table for the reserved keys.
///
/// ```
/// use tracing_log_format::clash::{FieldKey, FieldMap};
///
/// let map = FieldMap::new()
///     .with(FieldKey::Time, "@timestamp")
///     .with(FieldKey::Msg, "@message");
/// assert_eq!(map.resolve(FieldKey::Time), "@timestamp");
/// assert_eq!(map.resolve(FieldKey::Level), "level");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(HashMap<FieldKey, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: FieldKey, name: impl Into<String>) -> Self {
        self.insert(key, name);
        self
    }

    pub fn insert(&mut self, key: FieldKey, name: impl Into<String>) {
        self.0.insert(key, name.into());
    }

    /// Configured name for `key`, or its default name. An empty rename is
    /// treated as unmapped.
    pub fn resolve(&self, key: FieldKey) -> String {
        match self.0.get(&key) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => key.default_name().to_string(),
        }
    }
}

/// Resolved output names of the reserved fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKeys {
    pub time: String,
    pub level: String,
    pub msg: String,
}

impl ReservedKeys {
    pub fn resolve(map: &FieldMap) -> Self {
        ReservedKeys {
            time: map.resolve(FieldKey::Time),
            level: map.resolve(FieldKey::Level),
            msg: map.resolve(FieldKey::Msg),
        }
    }

    /// Names in the order clashes are resolved.
    pub fn names(&self) -> [&str; 3] {
        [&self.time, &self.msg, &self.level]
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self::resolve(&FieldMap::default())
    }
}

/// Move every attribute whose key equals a reserved name to
/// `fields.<name>`, keeping its value.
///
/// If `fields.<name>` is already present it is overwritten by the moved
/// attribute; collisions are not chased any further.
pub fn prefix_field_clashes<V>(fields: &mut HashMap<String, V>, reserved: &ReservedKeys) {
    for name in reserved.names() {
        if let Some(value) = fields.remove(name) {
            fields.insert(format!("{CLASH_PREFIX}{name}"), value);
        }
    }
}
