//! App-level configuration for the Prokerala provider.
//!
//! User-provided client credentials stored at:
//!   ~/.config/panchang/providers/prokerala/app_config.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URL: &str = "https://api.prokerala.com/token";
pub const DEFAULT_API_URL: &str = "https://api.prokerala.com/v2/astrology/panchang";

/// Lahiri.
pub const DEFAULT_AYANAMSA: u8 = 1;

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ayanamsa() -> u8 {
    DEFAULT_AYANAMSA
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Passed through to the provider unchanged.
    #[serde(default = "default_ayanamsa")]
    pub ayanamsa: u8,
}

impl AppConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        AppConfig {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: default_token_url(),
            api_url: default_api_url(),
            ayanamsa: DEFAULT_AYANAMSA,
        }
    }

    pub fn base_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("panchang")
            .join("providers")
            .join("prokerala"))
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("app_config.toml"))
    }

    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            anyhow::bail!(
                "Prokerala credentials not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-client-id\"\n\
                client_secret = \"your-client-secret\"\n\n\
                See https://api.prokerala.com/account/client for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            anyhow::bail!("client_id and client_secret must not be empty");
        }
        Ok(config)
    }
}
