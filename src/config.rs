use crate::error::{IoResultExt, ScanError, ScanResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up next to the input descriptor when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "enum-inventory.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Glob patterns, matched against project-relative document paths
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Keep designer and other generated files
    #[serde(default)]
    pub include_generated: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Config {
    pub fn load(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        toml::from_str(&content).map_err(|e| ScanError::config(path, e.message()))
    }

    /// Load `explicit` if given, else the default file in `dir` if present,
    /// else defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> ScanResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}
