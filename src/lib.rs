pub mod level;
pub mod value;
pub mod event;
pub mod clash;
pub mod sink;
pub mod formatter;

pub mod json;
pub mod text;

pub mod layer;
pub mod init;
pub mod env;

pub use event::{Fields, LogEvent};
pub use formatter::{BuildError, FormatError, Formatter, FormatterOptions};
pub use json::{JsonFormatter, JsonFormatterOptions};
pub use level::Level;
pub use text::{TextFormatter, TextFormatterOptions};
pub use value::Value;
