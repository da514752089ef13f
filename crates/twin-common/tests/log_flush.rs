//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration"
//! ems_type: "test"
//! ems_scope: "code"
//! ems_description: "Buffered log events reach the rolling file once the guard drops."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;

use twin_common::{init_tracing, LogFormat, LogSink, LoggingConfig};

#[test]
fn dropping_guard_flushes_rolling_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        directory: dir.path().to_path_buf(),
        format: LogFormat::StructuredJson,
        file_prefix: Some("flush".to_owned()),
    };
    let guard = init_tracing("twin-flush", &config, LogSink::FileOnly).unwrap();
    for frame in 0..64 {
        tracing::info!(frame, "headless frame written");
    }
    tracing::info!(marker = "last-event-before-exit", "headless run complete");
    drop(guard);

    let mut contents = String::new();
    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("flush.log"));
        if is_log {
            contents.push_str(&fs::read_to_string(&path).unwrap());
        }
    }
    assert!(contents.contains("last-event-before-exit"));
    assert_eq!(contents.matches("headless frame written").count(), 64);
}
