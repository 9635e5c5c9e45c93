//! Global panchang configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::cache::CalendarCache;
use crate::constants::{CACHE_NAMESPACE, CREDENTIAL_NAMESPACE, DEFAULT_CACHE_TTL};
use crate::error::{PanchangError, PanchangResult};
use crate::location::Location;
use crate::store::FileStore;

static DEFAULT_DATA_PATH: &str = "~/.local/share/panchang";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_cache_ttl() -> String {
    humantime::format_duration(DEFAULT_CACHE_TTL).to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Configuration at ~/.config/panchang/config.toml
///
/// Provider credentials live with the provider, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanchangConfig {
    /// Where cache records and the persisted credential are kept.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Human-readable duration, e.g. "7d" or "12h".
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Used when no location is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

impl Default for PanchangConfig {
    fn default() -> Self {
        PanchangConfig {
            data_dir: default_data_dir(),
            cache_ttl: default_cache_ttl(),
            location: None,
        }
    }
}

impl PanchangConfig {
    pub fn config_dir() -> PanchangResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| PanchangError::Config("Could not determine config directory".into()))?
            .join("panchang"))
    }

    pub fn config_path() -> PanchangResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config, writing a commented default file on first run.
    pub fn load() -> PanchangResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PanchangResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| PanchangError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PanchangError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PanchangResult<()> {
        let contents = format!(
            "\
# panchang configuration

# Where cached calendar data and provider tokens live:
# data_dir = \"{}\"

# How long fetched calendar data stays fresh:
# cache_ttl = \"{}\"

# Default location (Mumbai):
# [location]
# latitude = 19.076
# longitude = 72.8777
",
            DEFAULT_DATA_PATH,
            default_cache_ttl()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PanchangError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PanchangError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn cache_ttl(&self) -> PanchangResult<Duration> {
        humantime::parse_duration(&self.cache_ttl).map_err(|e| {
            PanchangError::Config(format!("Invalid cache_ttl '{}': {}", self.cache_ttl, e))
        })
    }

    pub fn default_location(&self) -> PanchangResult<Option<Location>> {
        self.location
            .map(|loc| Location::new(loc.latitude, loc.longitude))
            .transpose()
    }

    /// Store for cached calendar batches.
    pub fn cache_store(&self) -> FileStore {
        FileStore::new(self.data_path().join(CACHE_NAMESPACE))
    }

    /// Store for the persisted provider credential, separate from the cache.
    pub fn credential_store(&self) -> FileStore {
        FileStore::new(self.data_path().join(CREDENTIAL_NAMESPACE))
    }

    pub fn calendar_cache(&self) -> PanchangResult<CalendarCache> {
        Ok(CalendarCache::with_ttl(
            Arc::new(self.cache_store()),
            self.cache_ttl()?,
        ))
    }
}
