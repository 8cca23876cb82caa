use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::thread;
use tracing_log_format::clash::{FieldKey, FieldMap};
use tracing_log_format::{
    Formatter, FormatterOptions, JsonFormatterOptions, Level, LogEvent, TextFormatterOptions, Value,
};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap()
}

fn text(f: &dyn Formatter, mut event: LogEvent) -> String {
    String::from_utf8(f.format(&mut event).unwrap()).unwrap()
}

fn json(f: &dyn Formatter, mut event: LogEvent) -> serde_json::Map<String, serde_json::Value> {
    let bytes = f.format(&mut event).unwrap();
    assert!(bytes.ends_with(b"\n"));
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn text_scenario_started_with_pid() {
    let f = TextFormatterOptions::default().build(&false).unwrap();
    let event = LogEvent::at(fixed_time(), Level::Info, "started").with_field("pid", 123);
    assert_eq!(
        text(&f, event),
        "time=\"2024-01-02T15:04:05Z\" level=info msg=started pid=123\n"
    );
}

#[test]
fn json_scenario_error_with_empty_message() {
    let f = JsonFormatterOptions::default().build(&false).unwrap();
    let event = LogEvent::at(fixed_time(), Level::Error, "").with_field(
        "err",
        Value::error(io::Error::new(io::ErrorKind::Other, "disk full")),
    );
    let out = json(&f, event);

    assert_eq!(out.len(), 4);
    assert_eq!(out["level"], "error");
    assert_eq!(out["msg"], "");
    assert_eq!(out["err"], "disk full");
    assert_eq!(out["time"], "2024-01-02T15:04:05Z");
}

#[test]
fn json_round_trip_has_exactly_reserved_and_user_keys() {
    let f = JsonFormatterOptions {
        field_map: FieldMap::new().with(FieldKey::Msg, "message"),
        ..Default::default()
    }
    .build(&false)
    .unwrap();
    let event = LogEvent::at(fixed_time(), Level::Fatal, "bye")
        .with_field("message", "user message")
        .with_field("time", 1u64)
        .with_field("count", -3)
        .with_field("ok", false);
    let out = json(&f, event);

    let keys: HashSet<&str> = out.keys().map(String::as_str).collect();
    let expected: HashSet<&str> = [
        "time",
        "level",
        "message",
        "fields.message",
        "fields.time",
        "count",
        "ok",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
    assert_eq!(out["message"], "bye");
    assert_eq!(out["fields.message"], "user message");
    assert_eq!(out["fields.time"], 1);
    assert_eq!(out["count"], -3);
    assert_eq!(out["level"], "fatal");
}

#[test]
fn text_clash_keeps_both_values() {
    let f = TextFormatterOptions {
        disable_timestamp: true,
        ..Default::default()
    }
    .build(&false)
    .unwrap();
    let event = LogEvent::at(fixed_time(), Level::Info, "hi").with_field("msg", "shadow");
    assert_eq!(text(&f, event), "level=info msg=hi fields.msg=shadow\n");
}

#[test]
fn sorted_output_is_stable_across_calls() {
    let f = TextFormatterOptions::default().build(&false).unwrap();
    let make = || {
        let mut e = LogEvent::at(fixed_time(), Level::Debug, "m");
        for key in ["zeta", "alpha", "Mid", "beta", "_x", "10", "9"] {
            e = e.with_field(key, key);
        }
        e
    };
    let first = text(&f, make());
    for _ in 0..10 {
        assert_eq!(text(&f, make()), first);
    }
    assert!(first.ends_with(" 10=10 9=9 Mid=Mid _x=\"_x\" alpha=alpha beta=beta zeta=zeta\n"));
}

#[test]
fn unsorted_output_still_contains_every_field() {
    let f = TextFormatterOptions {
        disable_sorting: true,
        disable_timestamp: true,
        ..Default::default()
    }
    .build(&false)
    .unwrap();
    let event = LogEvent::at(fixed_time(), Level::Info, "m")
        .with_field("a", 1)
        .with_field("b", 2)
        .with_field("c", 3);
    let line = text(&f, event);

    assert!(line.starts_with("level=info msg=m "));
    for pair in ["a=1", "b=2", "c=3"] {
        assert!(line.contains(pair), "{} missing from {:?}", pair, line);
    }
}

#[test]
fn quoting_applies_to_every_unsafe_value() {
    let f = TextFormatterOptions {
        disable_timestamp: true,
        quote_empty_fields: true,
        ..Default::default()
    }
    .build(&false)
    .unwrap();
    let cases = [
        ("plain-1.0", "plain-1.0"),
        ("with space", "\"with space\""),
        ("a/b", "\"a/b\""),
        ("under_score", "\"under_score\""),
        ("", "\"\""),
    ];
    for (input, rendered) in cases {
        let event = LogEvent::at(fixed_time(), Level::Info, "q").with_field("v", input);
        assert_eq!(text(&f, event), format!("level=info msg=q v={}\n", rendered));
    }
}

#[test]
fn color_decision_never_changes_between_calls() {
    for probe in [true, false] {
        let f = TextFormatterOptions::default().build(&probe).unwrap();
        let first = text(&f, LogEvent::new(Level::Warning, "one")).contains('\x1b');
        let second = text(&f, LogEvent::new(Level::Error, "two")).contains('\x1b');
        assert_eq!(first, second);
        assert_eq!(first, f.is_colored());
    }
}

#[test]
fn options_build_a_boxed_formatter() {
    let opts: FormatterOptions = serde_json::from_str(
        r#"{"json": {"field_map": {"time": "@ts"}, "timestamp_format": "%Y"}}"#,
    )
    .unwrap();
    let f = opts.build(&io::stdout()).unwrap();
    let out = json(&*f, LogEvent::at(fixed_time(), Level::Info, "x"));
    assert_eq!(out["@ts"], "2024");

    let f = FormatterOptions::Text(TextFormatterOptions {
        disable_colors: true,
        disable_timestamp: true,
        ..Default::default()
    })
    .build(&io::stderr())
    .unwrap();
    assert_eq!(text(&*f, LogEvent::at(fixed_time(), Level::Panic, "x")), "level=panic msg=x\n");
}

#[test]
fn one_formatter_shared_across_threads() {
    let f: Arc<dyn Formatter> = Arc::from(
        FormatterOptions::Text(TextFormatterOptions {
            disable_timestamp: true,
            ..Default::default()
        })
        .build(&false)
        .unwrap(),
    );

    let handles: Vec<_> = (0..4u64)
        .map(|i| {
            let f = Arc::clone(&f);
            thread::spawn(move || {
                let mut event = LogEvent::at(fixed_time(), Level::Info, "worker").with_field("id", i);
                f.format(&mut event).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let line = String::from_utf8(handle.join().unwrap()).unwrap();
        assert_eq!(line, format!("level=info msg=worker id={}\n", i));
    }
}
