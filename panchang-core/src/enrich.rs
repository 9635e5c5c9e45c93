//! Derived, presentation-ready attributes for calendar entries.
//!
//! Pure functions of the raw entries and "today". Nothing here is persisted;
//! it is recomputed on every read so `is_today` never goes stale.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{TITHIS_PER_MONTH, TITHIS_PER_PAKSHA};
use crate::tithi::{CalendarEntry, LunarMonth, Paksha};

const EKADASHI: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Auspiciousness {
    Favorable,
    Unfavorable,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCalendarDay {
    #[serde(flatten)]
    pub entry: CalendarEntry,
    pub is_today: bool,
    pub is_current_half_cycle: bool,
    pub is_current_lunar_month: bool,
    pub moon_illumination_percent: f64,
    pub is_full_moon: bool,
    pub is_new_moon: bool,
    pub is_ekadashi: bool,
    pub auspiciousness: Auspiciousness,
}

/// Enrich every entry independently, preserving order.
///
/// The current half-cycle and lunar month are windowed around today's own
/// entry: if today is Shukla 5, the current half-cycle spans from four days
/// before to ten days after. When `entries` does not contain today, no day is
/// in the current half-cycle and the lunar month falls back to the Gregorian
/// approximation within thirty days of today.
pub fn enrich(entries: &[CalendarEntry], today: NaiveDate) -> Vec<EnrichedCalendarDay> {
    let anchor = entries.iter().find(|e| e.gregorian_date == today);

    entries
        .iter()
        .map(|entry| {
            let (is_current_half_cycle, is_current_lunar_month) = match anchor {
                Some(anchor) => (
                    in_current_half_cycle(entry, anchor),
                    in_current_lunar_month(entry, anchor),
                ),
                None => (
                    false,
                    entry.lunar_month == LunarMonth::approximate_for(today)
                        && (entry.gregorian_date - today).num_days().abs()
                            < TITHIS_PER_MONTH as i64,
                ),
            };
            enrich_entry(entry, today, is_current_half_cycle, is_current_lunar_month)
        })
        .collect()
}

fn enrich_entry(
    entry: &CalendarEntry,
    today: NaiveDate,
    is_current_half_cycle: bool,
    is_current_lunar_month: bool,
) -> EnrichedCalendarDay {
    let is_full_moon = is_full_moon(entry.tithi_number, entry.paksha);
    let is_new_moon = is_new_moon(entry.tithi_number, entry.paksha);
    let is_ekadashi = entry.tithi_number == EKADASHI;

    EnrichedCalendarDay {
        is_today: entry.gregorian_date == today,
        is_current_half_cycle,
        is_current_lunar_month,
        moon_illumination_percent: moon_illumination_percent(entry.tithi_number, entry.paksha),
        is_full_moon,
        is_new_moon,
        is_ekadashi,
        auspiciousness: auspiciousness(is_ekadashi, is_full_moon, is_new_moon, &entry.festivals),
        entry: entry.clone(),
    }
}

/// 0 at Amavasya, 100 at Purnima, linear in between.
pub fn moon_illumination_percent(tithi_number: u8, paksha: Paksha) -> f64 {
    let fifteen = TITHIS_PER_PAKSHA as f64;
    let t = tithi_number.clamp(1, TITHIS_PER_PAKSHA) as f64;
    match paksha {
        Paksha::Shukla => t / fifteen * 100.0,
        Paksha::Krishna => (fifteen - t) / fifteen * 100.0,
    }
}

pub fn is_full_moon(tithi_number: u8, paksha: Paksha) -> bool {
    tithi_number == TITHIS_PER_PAKSHA && paksha == Paksha::Shukla
}

pub fn is_new_moon(tithi_number: u8, paksha: Paksha) -> bool {
    tithi_number == TITHIS_PER_PAKSHA && paksha == Paksha::Krishna
}

/// Ekadashi, Purnima and festival days are favorable; Amavasya is not.
pub fn auspiciousness(
    is_ekadashi: bool,
    is_full_moon: bool,
    is_new_moon: bool,
    festivals: &[String],
) -> Auspiciousness {
    if is_ekadashi || is_full_moon || !festivals.is_empty() {
        Auspiciousness::Favorable
    } else if is_new_moon {
        Auspiciousness::Unfavorable
    } else {
        Auspiciousness::Mixed
    }
}

fn in_current_half_cycle(entry: &CalendarEntry, anchor: &CalendarEntry) -> bool {
    let today = anchor.gregorian_date;
    let start = today - Duration::days(anchor.tithi_number as i64 - 1);
    let end = today + Duration::days((TITHIS_PER_PAKSHA - anchor.tithi_number) as i64);
    entry.paksha == anchor.paksha && within(entry.gregorian_date, start, end)
}

fn in_current_lunar_month(entry: &CalendarEntry, anchor: &CalendarEntry) -> bool {
    let today = anchor.gregorian_date;
    let index = anchor.tithi_index();
    let start = today - Duration::days(index as i64 - 1);
    let end = today + Duration::days((TITHIS_PER_MONTH - index) as i64);
    within(entry.gregorian_date, start, end)
}

fn within(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}
