//! Loading config files from disk

use std::fs;
use std::time::Duration;

use rdsctl_core::config::{API_KEY_ENV, API_URL_ENV, Config, ConfigError};
use rdsctl_core::{Operation, ResourceKind};
use serial_test::serial;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

fn clear_env() {
    unsafe {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var("RDSCTL_IT_KEY");
    }
}

#[test]
#[serial]
fn test_missing_file_is_empty_config() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_path(&dir.path().join("nope.toml")).unwrap();
    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
#[serial]
fn test_full_config_with_waiters_and_env() {
    clear_env();
    unsafe {
        std::env::set_var("RDSCTL_IT_KEY", "from-env");
    }
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
default_profile = "prod"

[profiles.prod]
api_url = "https://rds.internal.example/v1"
api_key = "${RDSCTL_IT_KEY}"
region = "eu-west-1"

[profiles.prod.waiters.db_instance]
poll_interval_secs = 15
continuous_target_occurrence = 2
create_timeout_secs = 3600

[profiles.dev]
api_url = "http://localhost:8080"
"#,
    );

    let config = Config::load_from_path(&path).unwrap();
    let conn = config.resolve_connection(None, None).unwrap();

    assert_eq!(conn.profile.as_deref(), Some("prod"));
    assert_eq!(conn.api_key.as_deref(), Some("from-env"));
    assert_eq!(conn.region.as_deref(), Some("eu-west-1"));
    assert_eq!(
        conn.waiters
            .timeout_for(ResourceKind::DbInstance, Operation::Create),
        Some(Duration::from_secs(3600))
    );
    assert_eq!(
        conn.waiters
            .timeout_for(ResourceKind::DbCluster, Operation::Create),
        Some(Duration::from_secs(120 * 60))
    );

    let options = conn.waiters.wait_options(ResourceKind::DbInstance);
    assert_eq!(options.poll_interval, Some(Duration::from_secs(15)));
    assert_eq!(options.continuous_target_occurrence, Some(2));

    let dev = config.resolve_connection(Some("dev"), None).unwrap();
    assert_eq!(dev.api_url, "http://localhost:8080");
    assert!(dev.waiters.is_empty());

    clear_env();
}

#[test]
#[serial]
fn test_parse_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[profiles.prod\napi_url = 1");

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
#[serial]
fn test_profile_without_api_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[profiles.prod]\nregion = \"us-east-1\"\n");

    assert!(matches!(
        Config::load_from_path(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
#[serial]
fn test_invalid_waiter_fails_connection() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[profiles.prod]
api_url = "https://rds.example"

[profiles.prod.waiters.db_cluster]
update_timeout_secs = 0
"#,
    );

    let config = Config::load_from_path(&path).unwrap();
    let err = config.resolve_connection(None, None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidWaiter { .. }));
}

#[test]
#[serial]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = write_config(
        &dir,
        r#"
[profiles.prod]
api_url = "https://rds.example"

[profiles.prod.waiters.tenant_database]
delay_secs = 1
"#,
    );
    let config = Config::load_from_path(&source).unwrap();

    let target = dir.path().join("nested").join("saved.toml");
    config.save_to_path(&target).unwrap();
    let reloaded = Config::load_from_path(&target).unwrap();

    assert_eq!(reloaded.profiles["prod"], config.profiles["prod"]);
}
