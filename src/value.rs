use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Shared error object stored as an attribute value.
pub type SharedError = Arc<dyn Error + Send + Sync>;

/// Value attached to a [`LogEvent`](crate::event::LogEvent) attribute.
///
/// Cloning is cheap: error and display values are reference counted.
#[derive(Clone)]
pub enum Value {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    /// An error; formatters render its `Display` description.
    Error(SharedError),
    /// Any other printable value.
    Display(Arc<dyn fmt::Display + Send + Sync>),
}

impl Value {
    /// Wrap an error value.
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    /// Wrap an arbitrary printable value.
    pub fn display<D>(value: D) -> Self
    where
        D: fmt::Display + Send + Sync + 'static,
    {
        Value::Display(Arc::new(value))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::U64(v) => fmt::Display::fmt(v, f),
            Value::F64(v) => fmt::Display::fmt(v, f),
            Value::Bool(v) => fmt::Display::fmt(v, f),
            Value::Error(e) => fmt::Display::fmt(e, f),
            Value::Display(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(&format_args!("{}", e)).finish(),
            Value::Display(d) => f.debug_tuple("Display").field(&format_args!("{}", d)).finish(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Error(e) => serialize_display(&**e, serializer),
            Value::Display(d) => serialize_display(&**d, serializer),
        }
    }
}

/// Render through `Display` first so that a failing impl surfaces as a
/// serializer error instead of a half-written string.
fn serialize_display<D, S>(value: &D, serializer: S) -> Result<S::Ok, S::Error>
where
    D: fmt::Display + ?Sized,
    S: Serializer,
{
    let mut text = String::new();
    write!(text, "{}", value)
        .map_err(|_| S::Error::custom("value could not be formatted as text"))?;
    serializer.serialize_str(&text)
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U64(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<SharedError> for Value {
    fn from(v: SharedError) -> Self {
        Value::Error(v)
    }
}
