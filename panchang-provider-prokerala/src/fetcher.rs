//! Primary source: the Prokerala panchang endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use panchang_core::store::KeyValueStore;
use panchang_core::{
    CalendarEntry, DateRange, Location, PanchangError, PanchangResult, PanchangSource,
};

use crate::api::PanchangResponse;
use crate::app_config::AppConfig;
use crate::credential::CredentialManager;

pub struct PrimaryFetcher {
    http: reqwest::Client,
    credentials: CredentialManager,
    api_url: String,
    ayanamsa: u8,
}

impl PrimaryFetcher {
    pub fn new(http: reqwest::Client, config: &AppConfig, credentials: CredentialManager) -> Self {
        PrimaryFetcher {
            http,
            credentials,
            api_url: config.api_url.clone(),
            ayanamsa: config.ayanamsa,
        }
    }

    /// Build the fetcher and its credential manager from one config.
    pub fn from_config(config: &AppConfig, credential_store: Arc<dyn KeyValueStore>) -> Self {
        let http = reqwest::Client::new();
        let credentials = CredentialManager::new(http.clone(), config, credential_store);
        Self::new(http, config, credentials)
    }

    fn request(&self, range: &DateRange, location: &Location) -> reqwest::RequestBuilder {
        let datetime = range.start.and_time(NaiveTime::MIN).and_utc().to_rfc3339();
        self.http.get(&self.api_url).query(&[
            ("ayanamsa", self.ayanamsa.to_string()),
            ("datetime", datetime),
            ("coordinates", location.coordinates()),
            ("date_range", range.end_iso()),
        ])
    }
}

#[async_trait]
impl PanchangSource for PrimaryFetcher {
    fn name(&self) -> &str {
        "prokerala"
    }

    async fn fetch(
        &self,
        range: &DateRange,
        location: &Location,
    ) -> PanchangResult<Vec<CalendarEntry>> {
        let response = self
            .credentials
            .make_authenticated_request(self.request(range, location))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PanchangError::Fetch(format!(
                "Provider returned {}: {}",
                status,
                body.trim()
            )));
        }

        let payload: PanchangResponse = response.json().await.map_err(|e| {
            PanchangError::Fetch(format!("Failed to parse provider response: {}", e))
        })?;

        let entries = payload.into_entries(range)?;
        tracing::debug!(
            days = entries.len(),
            start = %range.start,
            end = %range.end,
            "mapped provider response"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{MockProvider, PanchangMode};
    use panchang_core::cache::CalendarCache;
    use panchang_core::store::MemoryStore;
    use panchang_core::{DataSource, Paksha, PanchangService};

    fn mumbai() -> Location {
        Location::new(19.076, 72.8777).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::from_args(start, Some(end)).unwrap()
    }

    fn fetcher(provider: &MockProvider) -> PrimaryFetcher {
        PrimaryFetcher::from_config(&provider.app_config(), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_fetch_sends_provider_query_and_maps_days() {
        let provider = MockProvider::start().await;
        let entries = fetcher(&provider)
            .fetch(&range("2024-03-25", "2024-03-27"), &mumbai())
            .await
            .unwrap();

        let query = provider.last_query();
        assert_eq!(query.get("ayanamsa").map(String::as_str), Some("1"));
        assert_eq!(
            query.get("datetime").map(String::as_str),
            Some("2024-03-25T00:00:00+00:00")
        );
        assert_eq!(query.get("coordinates").map(String::as_str), Some("19.076,72.8777"));
        assert_eq!(query.get("date_range").map(String::as_str), Some("2024-03-27"));

        assert_eq!(entries.len(), 3);
        let tithis: Vec<_> = entries.iter().map(|e| (e.tithi_number, e.paksha)).collect();
        assert_eq!(
            tithis,
            vec![(14, Paksha::Shukla), (15, Paksha::Shukla), (1, Paksha::Krishna)]
        );
        assert_eq!(entries[0].festivals, vec!["Holi", "Dhulandi"]);
        assert_eq!(entries[0].sunrise, "06:52");
        assert_eq!(entries[0].karana, "Kaulava");
        assert!(entries.iter().all(|e| e.validate().is_ok()));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let provider = MockProvider::start().await;
        provider.set_mode(PanchangMode::ServerError);

        let err = fetcher(&provider)
            .fetch(&range("2024-03-01", "2024-03-01"), &mumbai())
            .await
            .unwrap_err();
        assert!(matches!(err, PanchangError::Fetch(ref m) if m.contains("500")), "{err:?}");
    }

    #[tokio::test]
    async fn test_not_ok_status_and_garbage_are_fetch_errors() {
        let provider = MockProvider::start().await;
        let fetcher = fetcher(&provider);

        provider.set_mode(PanchangMode::NotOk);
        let err = fetcher.fetch(&range("2024-03-01", "2024-03-01"), &mumbai()).await.unwrap_err();
        assert!(matches!(err, PanchangError::Fetch(ref m) if m.contains("Invalid coordinates")));

        provider.set_mode(PanchangMode::Garbage);
        let err = fetcher.fetch(&range("2024-03-01", "2024-03-01"), &mumbai()).await.unwrap_err();
        assert!(matches!(err, PanchangError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_persistent_unauthorized_is_fetch_error_after_one_retry() {
        let provider = MockProvider::start().await;
        provider.reject_all_tokens();

        let err = fetcher(&provider)
            .fetch(&range("2024-03-01", "2024-03-01"), &mumbai())
            .await
            .unwrap_err();
        assert!(matches!(err, PanchangError::Fetch(ref m) if m.contains("401")));
        assert_eq!(provider.token_requests(), 2);
        assert_eq!(provider.api_requests(), 2);
    }

    #[tokio::test]
    async fn test_service_uses_primary_then_cache() {
        let provider = MockProvider::start().await;
        let service = PanchangService::new(CalendarCache::new(Arc::new(MemoryStore::new())))
            .with_primary(Arc::new(fetcher(&provider)));

        let first = service.get_range(&range("2024-03-25", "2024-03-27"), &mumbai(), false).await;
        assert!(first.success);
        assert_eq!(first.source, DataSource::Primary);
        assert!(first.entries[1].is_full_moon);

        let second = service.get_range(&range("2024-03-25", "2024-03-27"), &mumbai(), false).await;
        assert_eq!(second.source, DataSource::Cache);
        assert_eq!(provider.api_requests(), 1);
        assert_eq!(provider.token_requests(), 1);
    }

    #[tokio::test]
    async fn test_service_falls_back_when_provider_rejects_client() {
        let provider = MockProvider::start().await;
        let mut config = provider.app_config();
        config.client_secret = "wrong".into();
        let service = PanchangService::new(CalendarCache::new(Arc::new(MemoryStore::new())))
            .with_primary(Arc::new(PrimaryFetcher::from_config(
                &config,
                Arc::new(MemoryStore::new()),
            )));

        let result = service.get_range(&range("2024-03-01", "2024-03-03"), &mumbai(), false).await;
        assert!(result.success);
        assert_eq!(result.source, DataSource::Fallback);
        assert_eq!(result.entries.len(), 3);
        assert_eq!(provider.api_requests(), 0);
    }
}
