//! Prokerala panchang payload and its mapping onto `CalendarEntry`.
//!
//! The provider is loose about field names and shapes (a single day or a
//! list of days, festivals as strings or objects, `date` or `datetime`), so
//! the schema accepts the known variants and `to_entries` does all the
//! defaulting in one place:
//! - missing nakshatra/yoga/karana names become [`UNKNOWN_LABEL`]
//! - missing sunrise/sunset become [`UNKNOWN_TIME`]
//! - a missing date is taken from the position in the requested range
//! - a missing or out-of-range tithi makes the whole payload malformed

use chrono::{DateTime, Days, NaiveDate};
use panchang_core::tithi::{lunar_date_label, split_tithi_index};
use panchang_core::{CalendarEntry, DateRange, LunarMonth, PanchangError, PanchangResult};
use serde::Deserialize;

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const UNKNOWN_TIME: &str = "--:--";

const SUCCESS_STATUS: &str = "ok";

#[derive(Debug, Deserialize)]
pub struct PanchangResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<PanchangData>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PanchangData {
    Range { days: Vec<PanchangDay> },
    Single(PanchangDay),
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PanchangDay {
    #[serde(default, alias = "datetime")]
    pub date: Option<String>,
    #[serde(default)]
    pub tithi: Vec<Period>,
    #[serde(default)]
    pub nakshatra: Vec<Period>,
    #[serde(default)]
    pub yoga: Vec<Period>,
    #[serde(default)]
    pub karana: Vec<Period>,
    #[serde(default)]
    pub sunrise: Option<String>,
    #[serde(default)]
    pub sunset: Option<String>,
    #[serde(default)]
    pub moonrise: Option<String>,
    #[serde(default)]
    pub moonset: Option<String>,
    #[serde(default)]
    pub festivals: Vec<Festival>,
    #[serde(default, alias = "is_adhika_masa")]
    pub is_leap_month: Option<bool>,
    #[serde(default, alias = "rahu_kaal")]
    pub rahu_kalam: Option<String>,
    #[serde(default, alias = "gulika_kaal")]
    pub gulika_kalam: Option<String>,
}

/// A named sub-period (tithi, nakshatra, yoga, karana) in effect during the day.
#[derive(Debug, Default, Deserialize)]
pub struct Period {
    /// For tithis, the 1–30 position in the lunar month.
    #[serde(default)]
    pub id: Option<u8>,
    #[serde(default)]
    pub index: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Festival {
    Name(String),
    Detailed { name: String },
}

impl Festival {
    pub fn name(&self) -> &str {
        match self {
            Festival::Name(name) => name,
            Festival::Detailed { name } => name,
        }
    }
}

impl PanchangResponse {
    /// Check the success flag and map every day, in provider order.
    pub fn into_entries(self, range: &DateRange) -> PanchangResult<Vec<CalendarEntry>> {
        if self.status.as_deref() != Some(SUCCESS_STATUS) {
            return Err(PanchangError::Fetch(format!(
                "provider status {}: {}",
                self.status.as_deref().unwrap_or("missing"),
                describe_errors(&self.errors)
            )));
        }

        let days = match self.data {
            Some(PanchangData::Range { days }) => days,
            Some(PanchangData::Single(day)) => vec![day],
            None => return Err(PanchangError::Fetch("response has no data".into())),
        };
        if days.is_empty() {
            return Err(PanchangError::Fetch("response has no days".into()));
        }

        days.into_iter()
            .enumerate()
            .map(|(offset, day)| to_entry(offset, day, range))
            .collect()
    }
}

fn describe_errors(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| match (&e.title, &e.detail) {
            (Some(title), Some(detail)) => format!("{}: {}", title, detail),
            (Some(message), None) | (None, Some(message)) => message.clone(),
            (None, None) => UNKNOWN_LABEL.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map one provider day. `offset` is its position in the response.
pub fn to_entry(
    offset: usize,
    day: PanchangDay,
    range: &DateRange,
) -> PanchangResult<CalendarEntry> {
    let gregorian_date = match day.date.as_deref().and_then(parse_day) {
        Some(date) => date,
        None => range
            .start
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| PanchangError::Fetch(format!("day {} is out of range", offset)))?,
    };

    let raw_index = day
        .tithi
        .first()
        .and_then(|t| t.id.or(t.index))
        .ok_or_else(|| PanchangError::Fetch(format!("{}: no tithi in response", gregorian_date)))?;
    let (paksha, tithi_number) = split_tithi_index(raw_index)
        .map_err(|e| PanchangError::Fetch(format!("{}: {}", gregorian_date, e)))?;

    let lunar_month = LunarMonth::approximate_for(gregorian_date);

    Ok(CalendarEntry {
        sequence_id: offset as u32 + 1,
        gregorian_date,
        lunar_date_label: lunar_date_label(lunar_month, paksha, tithi_number),
        tithi_number,
        paksha,
        lunar_month,
        nakshatra: first_name(&day.nakshatra),
        yoga: first_name(&day.yoga),
        karana: first_name(&day.karana),
        sunrise: time_or_unknown(day.sunrise.as_deref()),
        sunset: time_or_unknown(day.sunset.as_deref()),
        moonrise: day.moonrise.as_deref().map(time_of_day),
        moonset: day.moonset.as_deref().map(time_of_day),
        festivals: day.festivals.iter().map(|f| f.name().to_string()).collect(),
        is_leap_month: day.is_leap_month,
        rahu_kalam: day.rahu_kalam,
        gulika_kalam: day.gulika_kalam,
    })
}

fn first_name(periods: &[Period]) -> String {
    periods
        .first()
        .and_then(|p| p.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Accepts "2024-03-01" or a full RFC 3339 timestamp; the local date is kept.
fn parse_day(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn time_or_unknown(s: Option<&str>) -> String {
    s.map(time_of_day).unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// "2024-03-01T06:52:13+05:30" becomes "06:52"; anything else is kept verbatim.
fn time_of_day(s: &str) -> String {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| s.to_string())
}
