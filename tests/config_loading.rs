use std::fs;

use soulform::{load_config, BrowserKind, ConfigError, SoulformConfig};
use tempfile::tempdir;

#[tokio::test]
async fn loads_explicit_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("soulform.yaml");
    fs::write(
        &path,
        "browser: firefox\nlog_level: debug\nfill:\n  locate_timeout_ms: 2000\n  slash_safe_textarea: false\n",
    )
    .unwrap();

    let loaded = load_config(Some(&path)).await.unwrap();
    assert!(loaded.found);
    assert_eq!(loaded.path, path);
    assert_eq!(loaded.config.browser_kind().unwrap(), BrowserKind::Firefox);
    assert_eq!(loaded.config.log_level, "debug");
    assert_eq!(loaded.config.fill.locate_timeout_ms, 2000);
    assert!(!loaded.config.fill.slash_safe_textarea);
    assert_eq!(loaded.config.fill.poll_interval_ms, 250);
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let loaded = load_config(Some(&path)).await.unwrap();
    assert!(!loaded.found);
    assert_eq!(loaded.config, SoulformConfig::default());
}

#[tokio::test]
async fn malformed_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "fill: [not, a, mapping]\n").unwrap();

    match load_config(Some(&path)).await {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed config accepted"),
    }
}

#[tokio::test]
async fn unsupported_browser_loads_but_does_not_validate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("soulform.yaml");
    fs::write(&path, "browser: lynx\n").unwrap();

    let loaded = load_config(Some(&path)).await.unwrap();
    assert!(matches!(
        loaded.config.browser_kind(),
        Err(ConfigError::UnsupportedBrowser(name)) if name == "lynx"
    ));
}
