//! Configuration loading
//!
//! Lookup order: explicit path, `./config/soulform.yaml`, then
//! `<config dir>/soulform/config.yaml`. A missing file yields defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tool_fill_form::FillPolicy;

pub const LOCAL_CONFIG_PATH: &str = "config/soulform.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to get config directory")]
    NoConfigDir,

    #[error("unsupported browser '{0}': expected chrome, chromium, firefox or edge")]
    UnsupportedBrowser(String),
}

/// Browsers a session can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Chromium,
    Firefox,
    Edge,
}

impl BrowserKind {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "chromium" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" => Ok(BrowserKind::Edge),
            _ => Err(ConfigError::UnsupportedBrowser(value.to_string())),
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoulformConfig {
    pub browser: String,
    pub log_level: String,
    pub fill: FillPolicy,
}

impl SoulformConfig {
    pub fn browser_kind(&self) -> Result<BrowserKind, ConfigError> {
        self.browser.parse()
    }
}

impl Default for SoulformConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chrome.name().to_string(),
            log_level: "info".to_string(),
            fill: FillPolicy::default(),
        }
    }
}

pub struct LoadedConfig {
    pub config: SoulformConfig,
    pub path: PathBuf,
    /// False when `path` did not exist and defaults were used
    pub found: bool,
}

/// Resolve the config path without touching the file itself.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return Ok(local);
    }

    let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    path.push("soulform");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = config_path(explicit)?;

    if !path.exists() {
        return Ok(LoadedConfig {
            config: SoulformConfig::default(),
            path,
            found: false,
        });
    }

    let content = fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    Ok(LoadedConfig {
        config,
        path,
        found: true,
    })
}

pub fn parse_config(content: &str) -> Result<SoulformConfig, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping.
    if content.trim().is_empty() {
        return Ok(SoulformConfig::default());
    }
    serde_yaml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_names_are_case_insensitive() {
        assert_eq!("Firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert_eq!(" edge ".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        assert!(matches!(
            "safari".parse::<BrowserKind>(),
            Err(ConfigError::UnsupportedBrowser(name)) if name == "safari"
        ));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config("browser: firefox\nfill:\n  submit_delay_ms: 500\n").unwrap();
        assert_eq!(config.browser, "firefox");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.fill.submit_delay_ms, 500);
        assert_eq!(config.fill.snapshot_max_len, 100);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("  \n").unwrap(), SoulformConfig::default());
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.yaml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn missing_explicit_file_uses_defaults() {
        let path = Path::new("/nonexistent/soulform.yaml");
        let loaded = tokio_test::block_on(load_config(Some(path))).unwrap();
        assert!(!loaded.found);
        assert_eq!(loaded.config.browser_kind().unwrap(), BrowserKind::Chrome);
    }
}
