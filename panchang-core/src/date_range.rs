//! Inclusive Gregorian date range for Panchang queries.

use chrono::{Datelike, Days, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PanchangError, PanchangResult};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> PanchangResult<Self> {
        if end < start {
            return Err(PanchangError::InvalidRange(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(DateRange { start, end })
    }

    /// Parse `from`/`to` arguments as YYYY-MM-DD.
    /// - `to` defaults to `from` (a single day)
    pub fn from_args(from: &str, to: Option<&str>) -> PanchangResult<Self> {
        let start = parse_date(from)?;
        let end = match to {
            Some(s) => parse_date(s)?,
            None => start,
        };
        Self::new(start, end)
    }

    /// January 1st through December 31st of `year`.
    pub fn year(year: i32) -> PanchangResult<Self> {
        let start = ymd(year, 1, 1)?;
        let end = ymd(year, 12, 31)?;
        Self::new(start, end)
    }

    /// First through last day of a Gregorian month.
    pub fn month(year: i32, month: Month) -> PanchangResult<Self> {
        let start = ymd(year, month.number_from_month(), 1)?;
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                PanchangError::InvalidRange(format!("{} {} is out of range", month.name(), year))
            })?;
        Self::new(start, end)
    }

    /// Number of days in the range, both ends included.
    pub fn num_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> PanchangResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        PanchangError::InvalidRange(format!(
            "{:04}-{:02}-{:02} is not a valid date",
            year, month, day
        ))
    })
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> PanchangResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        PanchangError::InvalidRange(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}

/// 1-based day of the year, used by the cyclic fallback tables.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_reversed_range() {
        let err = DateRange::new(date(2024, 3, 3), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, PanchangError::InvalidRange(_)));
    }

    #[test]
    fn test_single_day_when_to_missing() {
        let range = DateRange::from_args("2024-03-01", None).unwrap();
        assert_eq!(range.num_days(), 1);
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn test_bad_format_is_reported() {
        let err = DateRange::from_args("01/03/2024", None).unwrap_err();
        assert!(err.to_string().contains("Expected YYYY-MM-DD"));
    }

    #[test]
    fn test_month_window_handles_leap_february() {
        let range = DateRange::month(2024, Month::February).unwrap();
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));

        let december = DateRange::month(2023, Month::December).unwrap();
        assert_eq!(december.end, date(2023, 12, 31));
    }

    #[test]
    fn test_year_window_and_day_iteration() {
        let range = DateRange::year(2024).unwrap();
        assert_eq!(range.num_days(), 366);
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.first(), Some(&date(2024, 1, 1)));
        assert_eq!(days.last(), Some(&date(2024, 12, 31)));
    }
}
