//! Integration tests for ConfigManager
//!
//! Covers the defaults file, YAML overrides, environment overrides and
//! validation failures.

use camino::Utf8PathBuf;
use fetchdemo::{ConfigManager, DemoConfig};
use std::fs;
use tempfile::TempDir;

/// Helper to create a temporary config directory
fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().join("FetchDemo Data")).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_config_directory_created() {
    let (_temp_dir, config_path) = create_test_config_dir();
    assert!(!config_path.exists());

    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_DIR").unwrap();

    assert!(config_path.exists());
    assert_eq!(manager.config_dir(), config_path.as_path());
    assert_eq!(manager.config_path(), config_path.join("FetchDemo.yaml").as_path());
}

#[test]
fn test_defaults_written_and_loaded() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_DEFAULTS").unwrap();

    let config = manager.load().unwrap();

    assert_eq!(config.task.steps, 20);
    assert_eq!(config.task.step_interval_ms, 500);
    assert_eq!(config.task.result, "David Barnes");
    assert_eq!(config.window.title, "Async Await Window");

    let written = fs::read_to_string(manager.config_path()).unwrap();
    assert!(written.contains("steps: 20"));
    assert!(written.contains("David Barnes"));
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_PARTIAL").unwrap();

    fs::write(
        manager.config_path(),
        "task:\n  steps: 4\n  step_interval_ms: 10\nthreads:\n  max_thread_fetches: 2\n",
    )
    .unwrap();

    let config = manager.load().unwrap();

    assert_eq!(config.task.steps, 4);
    assert_eq!(config.task.step_interval_ms, 10);
    assert_eq!(config.task.result, "David Barnes");
    assert_eq!(config.threads.max_thread_fetches, 2);
    assert_eq!(config.threads.runtime_workers, 2);
    assert_eq!(config.logging, DemoConfig::default().logging);
}

#[test]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_ENV").unwrap();
    fs::write(manager.config_path(), "task:\n  steps: 4\n").unwrap();

    // The prefix is unique to this test, so no other test observes these
    unsafe {
        std::env::set_var("FETCHDEMO_IT_ENV__TASK__STEPS", "6");
        std::env::set_var("FETCHDEMO_IT_ENV__TASK__RESULT", "Grace Hopper");
    }

    let config = manager.load().unwrap();

    unsafe {
        std::env::remove_var("FETCHDEMO_IT_ENV__TASK__STEPS");
        std::env::remove_var("FETCHDEMO_IT_ENV__TASK__RESULT");
    }

    assert_eq!(config.task.steps, 6);
    assert_eq!(config.task.result, "Grace Hopper");
}

#[test]
fn test_invalid_values_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_INVALID").unwrap();

    fs::write(manager.config_path(), "threads:\n  max_thread_fetches: 0\n").unwrap();
    assert!(manager.load().is_err());

    fs::write(manager.config_path(), "task:\n  steps: 500\n").unwrap();
    let err = manager.load().unwrap_err();
    assert!(format!("{:#}", err).contains("got 500"));
}

#[test]
fn test_malformed_yaml_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_MALFORMED").unwrap();

    fs::write(manager.config_path(), "task: [unterminated\n").unwrap();

    assert!(manager.load().is_err());
}

#[test]
fn test_save_round_trips_custom_values() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "FETCHDEMO_IT_SAVE").unwrap();

    let mut config = DemoConfig::default();
    config.window.title = "Fetch Playground".to_string();
    config.logging.debug_mode = true;
    manager.save(&config).unwrap();

    assert_eq!(manager.load().unwrap(), config);
}
