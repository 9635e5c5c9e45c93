//! Prokerala astrology API provider for panchang-core.
//!
//! The provider manages its own client credentials and bearer token:
//!   ~/.config/panchang/providers/prokerala/app_config.toml
//!   <data_dir>/credentials/prokerala.json

pub mod api;
pub mod app_config;
pub mod credential;
pub mod fetcher;

#[cfg(test)]
mod test_server;

pub use app_config::AppConfig;
pub use credential::{Credential, CredentialManager};
pub use fetcher::PrimaryFetcher;
