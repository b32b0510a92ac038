//! Configuration loading tests

use mixroom_core::{MixroomConfig, MixroomError};
use std::fs;

#[test]
fn missing_file_falls_back_to_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = MixroomConfig::load_from(&temp_dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.engine.max_open_contexts, 6);
    assert_eq!(config.voice.sample_rate, 24_000);
}

#[test]
fn file_values_override_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("mixroom.toml");
    fs::write(
        &path,
        r#"
[engine]
max_open_contexts = 2
render_quantum = 256

[plan]
max_mixes_per_day = 5
"#,
    )
    .unwrap();

    let config = MixroomConfig::load_from(&path).unwrap();
    assert_eq!(config.engine.max_open_contexts, 2);
    assert_eq!(config.engine.render_quantum, 256);
    assert_eq!(config.plan.max_mixes_per_day, 5);
    // Untouched sections keep their defaults
    assert_eq!(config.plan.max_duration_seconds, 120.0);
    assert_eq!(config.voice.sample_rate, 24_000);
}

#[test]
fn invalid_file_values_are_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("mixroom.toml");
    fs::write(&path, "[engine]\nrender_quantum = 0\n").unwrap();

    let err = MixroomConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, MixroomError::Config(_)));
}

#[test]
fn malformed_file_is_a_config_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("mixroom.toml");
    fs::write(&path, "[engine\nmax_open_contexts = ").unwrap();

    let err = MixroomConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, MixroomError::Config(_)));
}
