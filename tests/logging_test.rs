//! Logging initialization test. Runs in its own binary since the
//! subscriber is process-global.

use forge_core::telemetry::{init_logging, LogConfig, LogError, LogFormat};

#[test]
fn json_logs_are_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forge.log");
    let config = LogConfig {
        format: LogFormat::Json,
        level: "info".to_string(),
        output_path: Some(path.clone()),
    };

    init_logging(&config).unwrap();
    tracing::info!(owner_id = "u1", "ledger opened");

    let contents = std::fs::read_to_string(&path).unwrap();
    let line = contents.lines().next().expect("one log line");
    let value: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(value["fields"]["message"], "ledger opened");
    assert_eq!(value["fields"]["owner_id"], "u1");

    assert!(matches!(
        init_logging(&LogConfig::default()),
        Err(LogError::AlreadyInitialized)
    ));
}
