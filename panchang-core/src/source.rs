//! Interchangeable producers of raw calendar entries.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::PanchangResult;
use crate::location::Location;
use crate::tithi::CalendarEntry;

/// Which fetcher produced a cached batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Primary,
    Fallback,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Primary => f.write_str("primary"),
            SourceTag::Fallback => f.write_str("fallback"),
        }
    }
}

/// A strategy that produces one batch of entries for a range and location.
///
/// Implementations return `PanchangError::Auth` or `PanchangError::Fetch`
/// on failure; the service decides what to do next.
#[async_trait]
pub trait PanchangSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        range: &DateRange,
        location: &Location,
    ) -> PanchangResult<Vec<CalendarEntry>>;
}
