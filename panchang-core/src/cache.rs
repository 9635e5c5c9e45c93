//! Durable, TTL-bound cache of fetched calendar batches.
//!
//! Storage failures never escape this module: they are logged and the cache
//! behaves as if it were empty, so the service degrades to always fetching.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CACHE_TTL;
use crate::date_range::DateRange;
use crate::location::Location;
use crate::source::SourceTag;
use crate::store::KeyValueStore;
use crate::tithi::CalendarEntry;

/// One cached batch. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: String,
    pub entries: Vec<CalendarEntry>,
    pub fetched_at_epoch_millis: i64,
    pub source_tag: SourceTag,
}

impl CacheRecord {
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.fetched_at_epoch_millis
    }
}

#[derive(Clone)]
pub struct CalendarCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl CalendarCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        CalendarCache { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// "panchang:2024-03-01:2024-03-03:19.0760,72.8777"
    pub fn key(range: &DateRange, location: &Location) -> String {
        format!(
            "panchang:{}:{}:{}",
            range.start_iso(),
            range.end_iso(),
            location.rounded()
        )
    }

    /// The record for `key`, unless missing, unreadable, or older than the TTL.
    /// Stale records are deleted on the way out.
    pub async fn get(&self, key: &str) -> Option<CacheRecord> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache record");
                self.delete(key).await;
                return None;
            }
        };

        let age = record.age_millis(Utc::now().timestamp_millis());
        if age > self.ttl.as_millis() as i64 {
            tracing::debug!(key, age_millis = age, "cache record expired");
            self.delete(key).await;
            return None;
        }

        tracing::debug!(
            key,
            source = %record.source_tag,
            entries = record.entries.len(),
            "cache hit"
        );
        Some(record)
    }

    /// Store `entries` under `key`, replacing any previous record.
    /// Returns the record as written, even if the store rejected it.
    pub async fn put(
        &self,
        key: &str,
        entries: Vec<CalendarEntry>,
        source_tag: SourceTag,
    ) -> CacheRecord {
        let record = CacheRecord {
            key: key.to_string(),
            entries,
            fetched_at_epoch_millis: Utc::now().timestamp_millis(),
            source_tag,
        };

        match serde_json::to_string(&record) {
            Ok(raw) => {
                if let Err(e) = self.store.put(key, raw).await {
                    tracing::warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "could not serialize cache record"),
        }

        record
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key, error = %e, "cache delete failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "cache clear failed");
        }
    }
}
