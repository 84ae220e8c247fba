//! On-disk settings for `nowcast`: which weather source to ask, the API key
//! for each source, and optionally a fixed place to report on.
//!
//! ```toml
//! default_source = "openweather"
//!
//! [sources.openweather]
//! api_key = "..."
//!
//! [location]
//! latitude = 33.57
//! longitude = -7.59
//! ```

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{model::Coordinates, source::SourceId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Source used by `nowcast show` when `--source` is not given.
    pub default_source: Option<String>,

    /// Credentials keyed by source id.
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,

    /// When set, `show` reports on this place and never asks for the
    /// current location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl Config {
    pub fn default_source_id(&self) -> Result<SourceId> {
        match self.default_source.as_deref() {
            Some(id) => SourceId::try_from(id),
            None => Err(anyhow!(
                "No default weather source configured.\n\
                 Hint: run `nowcast configure openweather` (or `weatherapi`) and paste your API key."
            )),
        }
    }

    pub fn set_default_source(&mut self, id: SourceId) {
        self.default_source = Some(id.to_string());
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration TOML")
    }

    /// Settings from the platform config directory; defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file yet, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write the settings, creating the directory on first save.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Failed to encode settings as TOML")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store the key for `id`. The first source ever configured also becomes
    /// the default.
    pub fn upsert_source_api_key(&mut self, id: SourceId, api_key: String) {
        self.sources.insert(id.to_string(), SourceConfig { api_key });
        if self.default_source.is_none() {
            self.set_default_source(id);
        }
    }

    pub fn source_api_key(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.as_str()).map(|s| s.api_key.as_str())
    }

    pub fn is_source_configured(&self, id: SourceId) -> bool {
        self.sources.contains_key(id.as_str())
    }
}
