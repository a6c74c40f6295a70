use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::{HttpSettings, ProviderId};

/// Overrides a single provider's connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub const DEFAULT_SPECIES: &str = "tiger";
pub const DEFAULT_LOCATION: &str = "New York";

/// Environment variable that points at an alternate config file.
pub const CONFIG_ENV: &str = "WILDLIFE_CONFIG";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub default_species: Option<String>,
    pub default_location: Option<String>,

    /// Example TOML:
    /// [providers.gbif]
    /// base_url = "https://api.gbif.org/v1"
    /// timeout_secs = 10
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    pub fn species(&self) -> &str {
        self.default_species.as_deref().unwrap_or(DEFAULT_SPECIES)
    }

    pub fn location(&self) -> &str {
        self.default_location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Provider defaults with any configured overrides applied.
    pub fn http_settings(&self, id: ProviderId) -> HttpSettings {
        let mut settings = HttpSettings::for_provider(id);

        if let Some(cfg) = self.provider_config(id) {
            if let Some(base_url) = &cfg.base_url {
                settings = settings.with_base_url(base_url.clone());
            }
            if let Some(secs) = cfg.timeout_secs {
                settings = settings.with_timeout(Duration::from_secs(secs));
            }
        }

        settings
    }

    pub fn upsert_provider(&mut self, id: ProviderId, provider: ProviderConfig) {
        self.providers.insert(id.as_str().to_string(), provider);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        for (name, provider) in &cfg.providers {
            ProviderId::try_from(name.as_str())
                .with_context(|| format!("Invalid provider section in {}", path.display()))?;
            if provider.timeout_secs == Some(0) {
                return Err(anyhow!("Provider '{name}' has a zero timeout"));
            }
        }

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file, honouring `WILDLIFE_CONFIG`.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("dev", "wildlife-insight", "wildlife-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
