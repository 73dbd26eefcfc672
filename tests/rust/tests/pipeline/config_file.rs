//! Tests for building loggers from config documents

use ctxlog::{LogConfig, LogError, Logger, OutputMode};

#[test]
fn file_logger_from_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("log.json");
    let logs = dir.path().join("logs");
    std::fs::write(
        &conf,
        serde_json::json!({
            "type": "file",
            "level": "INFO",
            "dir": logs,
            "filename": "svc.log",
        })
        .to_string(),
    )
    .unwrap();

    let config = LogConfig::from_file(&conf).unwrap();
    assert_eq!(config.output, OutputMode::File);

    let logger = Logger::new(config).unwrap();
    assert!(logger.rotation_daemon().is_none());
    logger.info("to disk");
    logger.debug("filtered");
    logger.flush();

    let written = std::fs::read_to_string(logs.join("svc.log")).unwrap();
    assert_eq!(written.lines().count(), 1);
    assert!(written.contains("||msg=to disk||"));
}

#[test]
fn none_mode_discards_output() {
    let config = LogConfig::from_json_str(r#"{"type":"none","level":"DEBUG"}"#).unwrap();
    let logger = Logger::new(config).unwrap();
    assert_eq!(logger.sink().kind(), "suppressed");
    logger.info("nowhere");
}

#[test]
fn invalid_documents_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("absent.json");
    let err = LogConfig::from_file(&missing).unwrap_err();
    assert!(err.to_string().starts_with("error opening conf file="));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "level: INFO").unwrap();
    let err = LogConfig::from_file(&broken).unwrap_err();
    assert!(matches!(err, LogError::ConfigParse { .. }));
    assert!(err.to_string().starts_with("error parsing conf file="));

    let nameless = dir.path().join("nameless.json");
    std::fs::write(&nameless, r#"{"type":"file","dir":"/tmp"}"#).unwrap();
    assert!(matches!(
        LogConfig::from_file(&nameless),
        Err(LogError::InvalidConfig(_))
    ));
}

#[test]
fn unopenable_file_target_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let file_in_the_way = dir.path().join("logs");
    std::fs::write(&file_in_the_way, "").unwrap();

    let config = LogConfig::file(&file_in_the_way, "svc.log", "INFO");
    let err = Logger::new(config).unwrap_err();
    assert!(matches!(err, LogError::SinkOpen { .. }));
}
