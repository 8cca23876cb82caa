use std::io;

use tracing::{error, info, warn};
use tracing_log_format::init::{init_logging_with_config, LoggingConfig};
use tracing_log_format::{FormatterOptions, TextFormatterOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Colors are used when stdout is a terminal; pipe the output through
    // `cat` to see the plain key=value form instead.
    let config = LoggingConfig {
        formatter: FormatterOptions::Text(TextFormatterOptions {
            full_timestamp: std::env::args().any(|a| a == "--full-timestamp"),
            ..Default::default()
        }),
        ..Default::default()
    };
    init_logging_with_config(config, io::stdout())?;

    info!("starting service");
    warn!(retries = 3, "upstream slow");

    let err = io::Error::new(io::ErrorKind::PermissionDenied, "invalid password");
    error!(
        user_id = 42,
        error = &err as &(dyn std::error::Error + 'static),
        "authentication failed"
    );
    Ok(())
}
