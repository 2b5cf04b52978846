use anyhow::{Context, Result};
use quantlens_data::ProviderConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which data source backs the analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

/// Settings read from the optional TOML config file.
///
/// Every field has a default, so an empty file (or no file) is valid.
/// Command-line flags and their environment variables override these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub provider: ProviderKind,
    /// Directory of `<SYMBOL>.csv` files for the CSV provider.
    pub data_dir: PathBuf,
    pub bind: String,
    pub yahoo: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            data_dir: PathBuf::from("data"),
            bind: "127.0.0.1:3000".to_string(),
            yahoo: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }
}
