//! File logging against the real global logger.
//!
//! The logger can be installed once per process, so the whole file-mode
//! behaviour is exercised by a single test.
use std::{env, fs, panic, path::Path};

use chrono::Utc;
use registry_client::logging::{compute_rolled_file_path, setup_logging};
use serial_test::serial;

#[test]
#[serial]
fn test_setup_logging_file_mode_creates_rolled_file_once() {
    let temp_dir = tempfile::tempdir().unwrap();
    let base = temp_dir.path().join("nested/registry-client.log");
    let base = base.to_str().unwrap().to_string();

    env::set_var("LOG_MODE", "file");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("LOG_FILE_PATH", &base);

    setup_logging();

    let expected = compute_rolled_file_path(&base, Utc::now().date_naive());
    assert!(
        Path::new(&expected).exists(),
        "Expected log file {} does not exist",
        expected
    );
    log::info!("written after setup");

    let second = panic::catch_unwind(setup_logging);
    let message = second
        .expect_err("a second logger must not install")
        .downcast::<String>()
        .map(|s| *s)
        .or_else(|e| e.downcast::<&str>().map(|s| s.to_string()))
        .unwrap_or_default();
    assert!(message.contains("Failed to initialize file logger"));

    assert!(fs::metadata(&expected).is_ok());

    env::remove_var("LOG_MODE");
    env::remove_var("LOG_LEVEL");
    env::remove_var("LOG_FILE_PATH");
}
