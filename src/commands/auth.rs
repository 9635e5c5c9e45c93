use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::DateTime;
use owo_colors::OwoColorize;
use panchang_core::config::PanchangConfig;
use panchang_provider_prokerala::{AppConfig, CredentialManager};

/// Request a token with the configured client credentials.
///
/// A missing provider config is reported with setup instructions.
pub async fn run() -> Result<()> {
    let config = PanchangConfig::load()?;
    let app_config = AppConfig::load()?;

    println!("Requesting a token from {}...", app_config.token_url);

    let credentials = CredentialManager::new(
        reqwest::Client::new(),
        &app_config,
        Arc::new(config.credential_store()),
    );
    let credential = credentials
        .valid_credential()
        .await
        .context("Provider rejected the configured client credentials")?;

    let expires = DateTime::from_timestamp_millis(credential.expires_at_millis())
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("{} token valid until {}", "Authenticated:".green(), expires);
    Ok(())
}
