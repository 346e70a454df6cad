use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_ASSET_DIR: &str = "weather_icons";
/// Looked up in the working directory before the platform config dir.
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

/// The `[api_key]` section: the static provider credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { endpoint: default_endpoint() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_asset_dir")]
    pub dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { dir: default_asset_dir() }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ASSET_DIR)
}

/// Immutable application configuration, read once at startup.
///
/// Example TOML:
/// [api_key]
/// key = "..."
///
/// [provider]
/// endpoint = "https://api.openweathermap.org/data/2.5/weather"
///
/// [assets]
/// dir = "weather_icons"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: ApiKeyConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub assets: AssetsConfig,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKeyConfig { key: api_key.into() },
            provider: ProviderConfig::default(),
            assets: AssetsConfig::default(),
        }
    }

    /// Parse and validate config text. A missing `[api_key]` section or an empty key is an error.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents).context("Invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.key.trim().is_empty() {
            bail!(
                "The [api_key] key entry is empty.\n\
                 Hint: run `weather configure` and enter your OpenWeatherMap API key."
            );
        }
        if self.provider.endpoint.trim().is_empty() {
            bail!("The [provider] endpoint entry is empty.");
        }
        Ok(())
    }

    /// Load config from `path`. Unlike a first-run default, absence is an error here:
    /// the app cannot do anything without a credential.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read config file: {}\n\
                 Hint: run `weather configure` to create it.",
                path.display()
            )
        })?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load config from the explicit path, `./config.toml`, or the platform config dir.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = Self::resolve_path(explicit)?;
        let cfg = Self::load_from(&path)?;
        Ok((cfg, path))
    }

    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }

        Self::config_file_path()
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
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

    /// Path to the config file in the platform config dir.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-window", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join(LOCAL_CONFIG_FILE))
    }

    pub fn api_key(&self) -> &str {
        self.api_key.key.trim()
    }

    pub fn endpoint(&self) -> &str {
        &self.provider.endpoint
    }

    pub fn asset_dir(&self) -> &Path {
        &self.assets.dir
    }

    pub fn with_asset_dir(mut self, dir: PathBuf) -> Self {
        self.assets.dir = dir;
        self
    }
}
