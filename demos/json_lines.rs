use std::io;
use std::time::Instant;

use tracing_log_format::clash::{FieldKey, FieldMap};
use tracing_log_format::{Formatter, JsonFormatterOptions, Level, LogEvent, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let formatter = JsonFormatterOptions {
        field_map: FieldMap::new()
            .with(FieldKey::Time, "@timestamp")
            .with(FieldKey::Msg, "@message"),
        ..Default::default()
    }
    .build(&io::stdout())?;

    let mut event = LogEvent::new(Level::Error, "order failed")
        .with_field("order_id", 123)
        .with_field("@message", "clashes with the renamed message key")
        .with_field("err", Value::error(io::Error::new(io::ErrorKind::Other, "disk full")));
    print!("{}", String::from_utf8(formatter.format(&mut event)?)?);

    let n: u64 = 100_000;
    let start = Instant::now();
    let mut bytes = 0usize;
    for i in 0..n {
        let mut event = LogEvent::new(Level::Info, "load test").with_field("iteration", i);
        bytes += formatter.format(&mut event)?.len();
    }

    let elapsed = start.elapsed();
    eprintln!(
        "formatted {} events ({} bytes) in {:?} (~{:.0} ev/s)",
        n,
        bytes,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
