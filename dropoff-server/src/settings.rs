//! Service settings loaded from TOML.
//!
//! The settings file is selected via:
//! 1. `--config <path>` command line argument
//! 2. `DROPOFF_CONFIG` environment variable
//! 3. `config/dropoff.toml`, if it exists
//!
//! With no file every section takes its defaults. `MAPBOX_TOKEN` overrides
//! the provider token from the file.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::directions::{DEFAULT_BASE_URL, MapboxConfig};
use crate::discovery::{DiscoveryConfig, Generations};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "DROPOFF_CONFIG";

/// Environment variable overriding the provider token.
pub const TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Settings file used when none is named.
pub const DEFAULT_CONFIG_PATH: &str = "config/dropoff.toml";

/// Error loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Mapbox access token. Empty selects the offline synthetic provider.
    pub access_token: String,
    pub base_url: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: 8,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 120,
            max_capacity: 10_000,
        }
    }
}

/// Tracking of per-session request generations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_secs: u64,
    pub max_sessions: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_secs: 600,
            max_sessions: 10_000,
        }
    }
}

/// Complete service settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub sessions: SessionSettings,
    pub discovery: DiscoveryConfig,
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Settings file named by the arguments or environment, else the
    /// default path if it exists.
    pub fn resolve_path(args: &[String], env_path: Option<String>) -> Option<PathBuf> {
        if let Some(pos) = args.iter().position(|a| a == "--config") {
            if let Some(path) = args.get(pos + 1) {
                return Some(PathBuf::from(path));
            }
        }
        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }

        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.exists().then_some(default)
    }

    /// Load settings for the process.
    ///
    /// A named file must load; with no file the defaults are used.
    pub fn load(args: &[String]) -> Result<Self, SettingsError> {
        let mut settings = match Self::resolve_path(args, env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.override_token(env::var(TOKEN_ENV).ok());
        Ok(settings)
    }

    /// Replace the provider token when `token` is set and non-empty.
    pub fn override_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.provider.access_token = token.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.provider.max_concurrent == 0 {
            return Err(SettingsError::Invalid(
                "provider.max_concurrent must be at least 1".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }
        self.discovery
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    /// Mapbox client configuration, or `None` without a token.
    pub fn mapbox_config(&self) -> Option<MapboxConfig> {
        let p = &self.provider;
        if p.access_token.is_empty() {
            return None;
        }
        Some(
            MapboxConfig::new(&p.access_token)
                .with_base_url(&p.base_url)
                .with_max_concurrent(p.max_concurrent)
                .with_timeout(p.timeout_secs),
        )
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_capacity: self.cache.max_capacity,
        }
    }

    pub fn generations(&self) -> Generations {
        Generations::new(
            Duration::from_secs(self.sessions.idle_secs),
            self.sessions.max_sessions,
        )
    }
}
