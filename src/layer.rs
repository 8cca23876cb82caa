use crate::event::{Fields, LogEvent};
use crate::formatter::Formatter;
use crate::value::Value;
use chrono::Utc;
use std::error::Error;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every observed event into a
/// [`LogEvent`], renders it with a built [`Formatter`] and writes the
/// bytes to `writer`.
///
/// The layer does no level filtering of its own; combine it with a
/// filter layer if only some events should be written.
pub struct FormatLayer<W> {
    formatter: Box<dyn Formatter>,
    inner: Mutex<Output<W>>,
}

struct Output<W> {
    writer: W,
    /// Buffer handed back by the last format call, reused for the next.
    spare: Vec<u8>,
}

impl<W> FormatLayer<W>
where
    W: Write + Send + 'static,
{
    pub fn new(formatter: Box<dyn Formatter>, writer: W) -> Self {
        FormatLayer {
            formatter,
            inner: Mutex::new(Output {
                writer,
                spare: Vec::new(),
            }),
        }
    }

    /// Format one event and write it out.
    ///
    /// Failures are reported on stderr and the event is dropped; logging
    /// never propagates errors into the instrumented code.
    pub fn write_event(&self, mut event: LogEvent) {
        let mut output = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        event.buffer = Some(std::mem::take(&mut output.spare));

        match self.formatter.format(&mut event) {
            Ok(bytes) => {
                if let Err(e) = output.writer.write_all(&bytes) {
                    eprintln!("error writing log record: {}", e);
                }
                output.spare = bytes;
            }
            Err(e) => eprintln!("error formatting log record: {}", e),
        }
    }
}

impl<S, W> Layer<S> for FormatLayer<W>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        let mut message = String::new();

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let mut log_event = LogEvent::at(Utc::now(), (*event.metadata().level()).into(), message);
        log_event.fields = fields;
        self.write_event(log_event);
    }
}

/// Collects the fields of a `tracing` event. The `message` field becomes
/// the event message; everything else becomes an attribute.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut String,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), Value::Str(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::U64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        let mut text = String::new();
        let _ = write!(text, "{}", value);
        let captured = CapturedError(text);
        self.fields
            .insert(field.name().to_string(), Value::Error(Arc::new(captured)));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), Value::Str(format!("{:?}", value)));
        }
    }
}

/// Description of an error observed through `tracing`, which only lends
/// the error for the duration of the visit.
#[derive(Debug, Clone)]
struct CapturedError(String);

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for CapturedError {}
