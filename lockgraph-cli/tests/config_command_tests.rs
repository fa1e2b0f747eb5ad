//! Integration tests for `lockgraph config` and configuration loading.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;

use tempfile::TempDir;

use lockgraph_cli::commands::config::{
    ConfigSource, build_config_report, load_config, resolve_source,
};

fn write_config(dir: &TempDir, content: &str) -> ConfigSource {
    let path = dir.path().join("lockgraph.toml");
    fs::write(&path, content).expect("should write config");
    resolve_source(Some(&path))
}

#[tokio::test]
async fn test_load_valid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(
        &temp_dir,
        r#"
[general]
log_level = "debug"
log_format = "json"

[catalog]
scan_dirs = ["/srv/app"]
workers = 4
output_format = "spdx"
"#,
    );

    let config = load_config(&source).await.expect("valid config should load");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.catalog.workers, 4);
    assert_eq!(config.catalog.output_format, "spdx");
}

#[tokio::test]
async fn test_load_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(&temp_dir, "");

    let config = load_config(&source).await.expect("empty config is valid");
    assert_eq!(config.catalog.scan_dirs, vec![".".to_owned()]);
}

#[tokio::test]
async fn test_load_malformed_toml_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(&temp_dir, "[general\nlog_level = \"info\"\n");

    let err = load_config(&source).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_load_missing_explicit_file_is_config_error() {
    let source = resolve_source(Some(std::path::Path::new("/nonexistent/lockgraph.toml")));

    let err = load_config(&source).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("/nonexistent/lockgraph.toml"));
}

#[tokio::test]
async fn test_load_rejects_out_of_range_catalog_limits() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(
        &temp_dir,
        r#"
[catalog]
max_depth = 0
"#,
    );

    let err = load_config(&source).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("max_depth"));
}

#[tokio::test]
async fn test_load_rejects_traversal_in_scan_dirs() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(
        &temp_dir,
        r#"
[catalog]
scan_dirs = ["../../etc"]
"#,
    );

    let err = load_config(&source).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial_test::serial]
async fn test_env_override_applies_to_file_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(&temp_dir, "[catalog]\nworkers = 2\n");

    let original = std::env::var("LOCKGRAPH_CATALOG_WORKERS").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOCKGRAPH_CATALOG_WORKERS", "6");
    }

    let result = load_config(&source).await;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOCKGRAPH_CATALOG_WORKERS", val),
            None => std::env::remove_var("LOCKGRAPH_CATALOG_WORKERS"),
        }
    }

    assert_eq!(result.expect("should load").catalog.workers, 6);
}

#[tokio::test]
#[serial_test::serial]
async fn test_defaults_source_reads_environment() {
    let original = std::env::var("LOCKGRAPH_CATALOG_OUTPUT_FORMAT").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("LOCKGRAPH_CATALOG_OUTPUT_FORMAT", "json");
    }

    let result = load_config(&ConfigSource::Defaults).await;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("LOCKGRAPH_CATALOG_OUTPUT_FORMAT", val),
            None => std::env::remove_var("LOCKGRAPH_CATALOG_OUTPUT_FORMAT"),
        }
    }

    assert_eq!(result.expect("should load").catalog.output_format, "json");
}

#[tokio::test]
async fn test_show_report_round_trips_through_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let source = write_config(&temp_dir, "[catalog]\nmax_packages = 1234\n");
    let config = load_config(&source).await.unwrap();

    let report = build_config_report(&config, &source, None).unwrap();
    assert!(report.source.ends_with("lockgraph.toml"));

    let reparsed = lockgraph_core::config::LockgraphConfig::parse(&report.config_toml)
        .expect("shown config should parse back");
    assert_eq!(reparsed.catalog.max_packages, 1234);
}
