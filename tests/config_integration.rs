//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `fetchgraph.toml` files load from disk, apply
//! environment overrides, and drive session defaults.

use std::io::Write;
use std::sync::Arc;

use fetchgraph::prelude::*;
use fetchgraph::SchemaError;
use fetchgraph::query::SessionConfig;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

fn scenario_store() -> Arc<RowStore> {
    let store = Arc::new(RowStore::new());
    let a = store.insert_artist("A");
    let b = store.insert_artist("B");
    store.insert_song("S1", a).unwrap();
    store.insert_song("S2", a).unwrap();
    store.insert_song("S3", b).unwrap();
    store
}

/// Test an empty file gives the defaults
#[test]
fn test_config_empty_file() {
    let file = write_config("");
    let config = FetchGraphConfig::from_file(file.path()).expect("Failed to load config");

    assert_eq!(config.default_policy(), LoadingPolicy::Eager);
    assert!(config.debug.log_fetches);
    assert_eq!(config.debug.n_plus_one_threshold, 10);
}

/// Test full configuration with all sections
#[test]
fn test_config_full_file() {
    let file = write_config(
        r#"
        [loading]
        policy = "batch(25)"

        [debug]
        log_fetches = false
        n_plus_one_threshold = 3

        [environments.production.loading]
        policy = "join-fetch"

        [environments.production.debug]
        n_plus_one_threshold = 1
    "#,
    );

    let config = FetchGraphConfig::from_file(file.path()).expect("Failed to load config");
    assert_eq!(config.default_policy(), LoadingPolicy::batch(25).unwrap());
    assert!(!config.debug.log_fetches);

    let production = config.with_environment("production");
    assert_eq!(production.default_policy(), LoadingPolicy::JoinFetch);
    assert_eq!(production.debug.n_plus_one_threshold, 1);
    assert!(!production.debug.log_fetches);
}

/// Test an unknown environment leaves the config unchanged
#[test]
fn test_config_unknown_environment() {
    let config: FetchGraphConfig = r#"
        [loading]
        policy = "subselect"
    "#
    .parse()
    .unwrap();

    let config = config.with_environment("staging");
    assert_eq!(config.default_policy(), LoadingPolicy::Subselect);
}

/// Test a missing file reports its path
#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fetchgraph.toml");

    let err = FetchGraphConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, SchemaError::IoError { .. }));
    assert!(err.to_string().contains("fetchgraph.toml"));
}

/// Test invalid policies are rejected with a diagnostic
#[test]
fn test_config_invalid_policy() {
    for policy in ["sometimes", "batch(0)", "batch(x)"] {
        let file = write_config(&format!("[loading]\npolicy = \"{policy}\"\n"));
        let err = FetchGraphConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SchemaError::TomlError { .. }), "{policy}: {err}");
    }
}

/// Test unknown keys are rejected
#[test]
fn test_config_unknown_key() {
    let file = write_config("[loading]\nstrategy = \"lazy\"\n");
    assert!(FetchGraphConfig::from_file(file.path()).is_err());
}

/// Test a zero threshold fails validation
#[test]
fn test_config_zero_threshold() {
    let file = write_config("[debug]\nn_plus_one_threshold = 0\n");
    let err = FetchGraphConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, SchemaError::ConfigError { .. }));
}

/// Test a loaded file drives the session default policy
#[test]
fn test_config_drives_session() {
    let file = write_config(
        r#"
        [loading]
        policy = "subselect"

        [debug]
        n_plus_one_threshold = 2
    "#,
    );
    let config = FetchGraphConfig::from_file(file.path()).unwrap();

    let session = Session::from_config(scenario_store(), &config);
    assert_eq!(session.config().default_policy, LoadingPolicy::Subselect);
    assert_eq!(session.config().n_plus_one_threshold, 2);

    let artists = session.load_default().unwrap();
    assert_eq!(artists.len(), 2);
    assert_eq!(session.fetch_count(), 2);
}

/// Test session settings built from a config match the builder
#[test]
fn test_session_config_from_file_config() {
    let config: FetchGraphConfig = "[loading]\npolicy = \"lazy\"\n".parse().unwrap();
    let from_file = SessionConfig::from(&config);
    let built = SessionConfig::new().with_default_policy(LoadingPolicy::Lazy);

    assert_eq!(from_file.default_policy, built.default_policy);
    assert_eq!(from_file.log_fetches, built.log_fetches);
    assert_eq!(from_file.n_plus_one_threshold, built.n_plus_one_threshold);
}
