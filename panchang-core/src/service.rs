//! The Panchang service: the one entry point consumers talk to.
//!
//! Per request: cache check, then the primary source, then the fallback
//! calculator. Whatever succeeds is cached before it is enriched and
//! returned. Nothing but the cache (and whatever the primary source owns)
//! survives between requests.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, Month, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheRecord, CalendarCache};
use crate::date_range::DateRange;
use crate::enrich::{EnrichedCalendarDay, enrich};
use crate::error::PanchangResult;
use crate::fallback::FallbackCalculator;
use crate::location::Location;
use crate::source::{PanchangSource, SourceTag};
use crate::tithi::CalendarEntry;

/// Where the returned entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Cache,
    Primary,
    Fallback,
}

impl From<SourceTag> for DataSource {
    fn from(tag: SourceTag) -> Self {
        match tag {
            SourceTag::Primary => DataSource::Primary,
            SourceTag::Fallback => DataSource::Fallback,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Cache => f.write_str("cache"),
            DataSource::Primary => f.write_str("primary"),
            DataSource::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeResult {
    /// False only when even the fallback calculator failed.
    pub success: bool,
    pub entries: Vec<EnrichedCalendarDay>,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl RangeResult {
    fn unavailable() -> Self {
        RangeResult {
            success: false,
            entries: Vec::new(),
            source: DataSource::Cache,
            fetched_at: Utc::now(),
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Constructed once at the composition root and shared by handle.
#[derive(Clone)]
pub struct PanchangService {
    cache: CalendarCache,
    primary: Option<Arc<dyn PanchangSource>>,
    fallback: Arc<dyn PanchangSource>,
    today: fn() -> NaiveDate,
}

impl PanchangService {
    /// A fallback-only service. Add a remote source with [`Self::with_primary`].
    pub fn new(cache: CalendarCache) -> Self {
        PanchangService {
            cache,
            primary: None,
            fallback: Arc::new(FallbackCalculator::new()),
            today: local_today,
        }
    }

    pub fn with_primary(mut self, primary: Arc<dyn PanchangSource>) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn PanchangSource>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Override the wall-clock date used for `is_today` and friends.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn get_range(
        &self,
        range: &DateRange,
        location: &Location,
        force_refresh: bool,
    ) -> RangeResult {
        let key = CalendarCache::key(range, location);

        if !force_refresh {
            if let Some(record) = self.cache.get(&key).await {
                return self.respond(&record.entries, DataSource::Cache, fetched_at(&record));
            }
        }

        if let Some(primary) = &self.primary {
            match primary.fetch(range, location).await {
                Ok(entries) => {
                    tracing::info!(
                        key = %key,
                        source = primary.name(),
                        entries = entries.len(),
                        "fetched from primary"
                    );
                    return self.store_and_respond(&key, entries, SourceTag::Primary).await;
                }
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        source = primary.name(),
                        error = %e,
                        "primary fetch failed, using fallback"
                    );
                }
            }
        }

        match self.fallback.fetch(range, location).await {
            Ok(entries) => self.store_and_respond(&key, entries, SourceTag::Fallback).await,
            Err(e) => {
                tracing::error!(
                    key = %key,
                    source = self.fallback.name(),
                    error = %e,
                    "fallback failed, no data available"
                );
                RangeResult::unavailable()
            }
        }
    }

    /// The whole Gregorian year.
    pub async fn get_year(&self, year: i32, location: &Location) -> PanchangResult<RangeResult> {
        let range = DateRange::year(year)?;
        Ok(self.get_range(&range, location, false).await)
    }

    /// One Gregorian month.
    pub async fn get_month(
        &self,
        year: i32,
        month: Month,
        location: &Location,
    ) -> PanchangResult<RangeResult> {
        let range = DateRange::month(year, month)?;
        Ok(self.get_range(&range, location, false).await)
    }

    pub async fn clear_cache(&self) {
        tracing::info!("clearing panchang cache");
        self.cache.clear().await;
    }

    async fn store_and_respond(
        &self,
        key: &str,
        entries: Vec<CalendarEntry>,
        tag: SourceTag,
    ) -> RangeResult {
        // Cache first: callers never see a batch that was not written
        let record = self.cache.put(key, entries, tag).await;
        self.respond(&record.entries, tag.into(), fetched_at(&record))
    }

    fn respond(
        &self,
        entries: &[CalendarEntry],
        source: DataSource,
        fetched_at: DateTime<Utc>,
    ) -> RangeResult {
        RangeResult {
            success: true,
            entries: enrich(entries, (self.today)()),
            source,
            fetched_at,
        }
    }
}

fn fetched_at(record: &CacheRecord) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(record.fetched_at_epoch_millis).unwrap_or_else(Utc::now)
}
