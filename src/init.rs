use crate::formatter::{BuildError, FormatterOptions};
use crate::layer::FormatLayer;
use crate::sink::TerminalProbe;
use std::io::{self, Write};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Logging setup installed by [`init_logging_with_config`].
///
/// **Fields**
/// - `formatter`: which formatter to build, and its options.
/// - `max_level`: most verbose `tracing` level that reaches the
///   formatter. Filtering happens in the subscriber, never in the
///   formatter itself.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub formatter: FormatterOptions,
    pub max_level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            formatter: FormatterOptions::default(),
            max_level: LevelFilter::INFO,
        }
    }
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("failed to build formatter: {0}")]
    Build(#[from] BuildError),

    #[error("failed to set global subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that writes every event to
/// `writer` through the configured formatter.
///
/// **Parameters**
/// - `config`: [`LoggingConfig`] selecting formatter and level.
/// - `writer`: destination of the formatted bytes. It is probed once to
///   decide whether the text formatter uses colors.
///
/// **Returns**
/// - `Err(InitError::Build)` if the formatter options are invalid.
/// - `Err(InitError::SetGlobal)` if a global subscriber is already set.
pub fn init_logging_with_config<W>(config: LoggingConfig, writer: W) -> Result<(), InitError>
where
    W: Write + TerminalProbe + Send + 'static,
{
    let formatter = config.formatter.build(&writer)?;
    let layer = FormatLayer::new(formatter, writer);

    let subscriber = Registry::default().with(config.max_level).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Initialize logging with [`LoggingConfig::default`]: text formatter,
/// `INFO` and above.
pub fn init_logging<W>(writer: W) -> Result<(), InitError>
where
    W: Write + TerminalProbe + Send + 'static,
{
    init_logging_with_config(LoggingConfig::default(), writer)
}

/// Initialize logging to stderr, configured from the `LOG_*` environment
/// variables (see [`crate::env`]).
pub fn init_logging_from_env() -> Result<(), InitError> {
    init_logging_with_config(LoggingConfig::from_env(), io::stderr())
}
