use cascade::{CascadeConfig, ObservabilityConfig};
use std::path::PathBuf;

#[test]
fn test_observability_follows_config() {
    let config = CascadeConfig::default()
        .with_log_level("debug")
        .with_log_file("logs/cascade.log");

    let obs = ObservabilityConfig::from_config(&config);

    assert_eq!(obs.log_level, "debug");
    assert_eq!(obs.log_file, Some(PathBuf::from("logs/cascade.log")));
    assert!(!obs.json_logs);
}

#[test]
fn test_blank_log_file_disables_file_logging() {
    let config = CascadeConfig::default().with_log_file("   ");

    assert_eq!(ObservabilityConfig::from_config(&config).log_file, None);
}

#[test]
fn test_observability_overrides() {
    let obs = ObservabilityConfig::default()
        .with_log_level("warn")
        .with_log_file(None)
        .with_json_logs(true);

    assert_eq!(obs.log_level, "warn");
    assert!(obs.log_file.is_none());
    assert!(obs.json_logs);
}

#[test]
fn test_init_with_file_layer() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("cascade.log");
    let obs = ObservabilityConfig::default().with_log_file(Some(path.clone()));

    cascade::init_observability(&obs)?;
    tracing::info!("hello from the log file test");

    assert!(path.exists());
    assert!(cascade::init_observability(&obs).is_err());
    Ok(())
}
