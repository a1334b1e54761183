use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::models::simulation::EngineConstants;

pub const CONFIG_PATH_ENV: &str = "SOLAR_YIELD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_port() -> u16 { 8000 }
fn default_static_dir() -> String { "static".to_string() }
fn default_archive_url() -> String { "https://archive-api.open-meteo.com/v1/archive".to_string() }
fn default_elevation_url() -> String { "https://api.open-elevation.com/api/v1/lookup".to_string() }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub climate: ClimateConfig,
    #[serde(default)]
    pub engine: EngineConstants,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            static_dir: default_static_dir(),
            climate: ClimateConfig::default(),
            engine: EngineConstants::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// Endpoints of the two external data sources.
#[derive(Debug, Deserialize, Clone)]
pub struct ClimateConfig {
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_elevation_url")]
    pub elevation_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            elevation_url: default_elevation_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Reads the file named by `SOLAR_YIELD_CONFIG` (or `config.json`).
    /// A missing file means built-in defaults; a malformed one is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!(%path, "config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
