//! Tests for record enrichment and line rendering

use pretty_assertions::assert_eq;
use serde::Serialize;
use std::time::Duration;

use ctxlog::{fields, format_duration_ms, FieldValue, Record};
use tests::{capture_logger, field, pairs};

#[test]
fn only_allow_listed_fields_in_fixed_order() {
    let (logger, buf) = capture_logger("DEBUG");
    logger.info(fields! {
        "type" => "audit",
        "password" => "hunter2",
        "client_ip" => "10.1.2.3",
        "data" => FieldValue::json(&serde_json::json!({"id": 7})),
        "cost" => 1.25,
        "msg" => "login",
    });

    let line = &buf.lines()[0];
    let names: Vec<String> = pairs(line).into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec![
            "level",
            "file",
            "trace_id",
            "msg",
            "cost",
            "timestamp",
            "host",
            "data",
            "client_ip",
            "type",
        ]
    );
    assert!(!line.contains("hunter2"));
    assert_eq!(field(line, "data").as_deref(), Some(r#"{"id":7}"#));
    assert_eq!(field(line, "cost").as_deref(), Some("1.25"));
}

#[test]
fn pipeline_fields_are_stamped() {
    let (logger, buf) = capture_logger("INFO");
    logger.warning("careful");

    let line = &buf.lines()[0];
    assert_eq!(field(line, "level").as_deref(), Some("WARNING"));
    assert_eq!(field(line, "timestamp").as_deref(), Some("2023-01-10 08:00:00.000"));
    assert_eq!(field(line, "host").as_deref(), Some("test-host"));
    assert_eq!(
        field(line, "trace_id"),
        Some(std::process::id().to_string())
    );
}

#[test]
fn macro_file_field_names_function() {
    let (logger, buf) = capture_logger("INFO");
    let line_no = line!() + 1;
    ctxlog::infof!(&logger; "user {} loaded", 7);

    let line = &buf.lines()[0];
    assert_eq!(
        field(line, "file"),
        Some(format!(
            "tests/pipeline/formatting.rs:{}::pipeline::formatting::macro_file_field_names_function",
            line_no
        ))
    );
    assert_eq!(field(line, "msg").as_deref(), Some("user 7 loaded"));
}

#[test]
fn caller_supplied_file_wins() {
    let (logger, buf) = capture_logger("INFO");
    logger.info(fields! { "msg" => "q", "file" => "dao/user.go:88" });
    assert_eq!(
        field(&buf.lines()[0], "file").as_deref(),
        Some("dao/user.go:88")
    );
}

#[test]
fn value_coercion() {
    let (logger, buf) = capture_logger("INFO");
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such row");
    logger.info(fields! {
        "msg" => FieldValue::error(&err),
        "cost" => format_duration_ms(Duration::from_micros(1500)),
        "data" => b"raw bytes".as_slice(),
        "type" => FieldValue::Null,
    });

    let line = &buf.lines()[0];
    assert_eq!(field(line, "msg").as_deref(), Some("no such row"));
    assert_eq!(field(line, "cost").as_deref(), Some("1.50"));
    assert_eq!(field(line, "data").as_deref(), Some("raw bytes"));
    assert_eq!(field(line, "type").as_deref(), Some(""));
}

#[test]
fn debug_value_serializes_into_msg() {
    #[derive(Serialize)]
    struct Query {
        table: &'static str,
        limit: u32,
    }

    let (logger, buf) = capture_logger("DEBUG");
    logger.debug_value(&Query {
        table: "users",
        limit: 10,
    });
    assert_eq!(
        field(&buf.lines()[0], "msg").as_deref(),
        Some(r#"{"table":"users","limit":10}"#)
    );

    let (quiet, buf) = capture_logger("INFO");
    quiet.debug_value(&Query {
        table: "users",
        limit: 10,
    });
    assert!(buf.lines().is_empty());
}

#[test]
fn empty_record_still_gets_pipeline_fields() {
    let (logger, buf) = capture_logger("INFO");
    logger.info(Record::new());
    let line = &buf.lines()[0];
    assert!(line.starts_with("level=INFO||file="));
    assert_eq!(field(line, "msg"), None);
}
