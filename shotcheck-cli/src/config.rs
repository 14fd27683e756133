//! CLI configuration loading
//!
//! Defaults layered under a single TOML file: the user config at
//! `<config dir>/shotcheck/config.toml` when present, or an explicit
//! `--config` path which must exist.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shotcheck_core::AssessConfig;

/// Top-level CLI/server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub server: ServerSection,
    pub assess: AssessConfig,
}

/// \[server\] section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7478,
        }
    }
}

/// Default config path under the user config dir
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shotcheck").join("config.toml"))
}

/// Load configuration, preferring an explicit path
pub fn load(explicit: Option<&Path>) -> Result<CliConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_path().filter(|path| path.exists()),
    };

    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config at {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("invalid config at {}", path.display()))
        }
        None => Ok(CliConfig::default()),
    }
}
