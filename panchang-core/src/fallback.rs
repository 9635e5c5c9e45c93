//! Offline approximate Panchang calculator.
//!
//! Used when the remote provider is unavailable. Every rule here is a
//! deliberate simplification: tithis follow a fixed 30-day cycle seeded at the
//! start of the requested range, nakshatras cycle by day of year, and
//! festivals come from a short fixed-date table. It performs no I/O and
//! cannot fail.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};

use crate::constants::TITHIS_PER_MONTH;
use crate::date_range::{DateRange, day_of_year};
use crate::error::PanchangResult;
use crate::location::Location;
use crate::source::PanchangSource;
use crate::tithi::{CalendarEntry, LunarMonth, Paksha, lunar_date_label, split_tithi_index};

pub const NAKSHATRAS: [&str; 27] = [
    "Ashwini",
    "Bharani",
    "Krittika",
    "Rohini",
    "Mrigashira",
    "Ardra",
    "Punarvasu",
    "Pushya",
    "Ashlesha",
    "Magha",
    "Purva Phalguni",
    "Uttara Phalguni",
    "Hasta",
    "Chitra",
    "Swati",
    "Vishakha",
    "Anuradha",
    "Jyeshtha",
    "Mula",
    "Purva Ashadha",
    "Uttara Ashadha",
    "Shravana",
    "Dhanishta",
    "Shatabhisha",
    "Purva Bhadrapada",
    "Uttara Bhadrapada",
    "Revati",
];

pub const YOGAS: [&str; 27] = [
    "Vishkambha",
    "Priti",
    "Ayushman",
    "Saubhagya",
    "Shobhana",
    "Atiganda",
    "Sukarma",
    "Dhriti",
    "Shula",
    "Ganda",
    "Vriddhi",
    "Dhruva",
    "Vyaghata",
    "Harshana",
    "Vajra",
    "Siddhi",
    "Vyatipata",
    "Variyana",
    "Parigha",
    "Shiva",
    "Siddha",
    "Sadhya",
    "Shubha",
    "Shukla",
    "Brahma",
    "Indra",
    "Vaidhriti",
];

const MOVABLE_KARANAS: [&str; 7] = [
    "Bava", "Balava", "Kaulava", "Taitila", "Garaja", "Vanija", "Vishti",
];

/// (month, day, name). Fixed Gregorian dates, most significant first per day.
const FESTIVALS: [(u32, u32, &str); 10] = [
    (1, 14, "Makar Sankranti"),
    (2, 14, "Vasant Panchami"),
    (3, 8, "Maha Shivaratri"),
    (3, 25, "Holi"),
    (4, 14, "Baisakhi"),
    (8, 19, "Raksha Bandhan"),
    (8, 26, "Krishna Janmashtami"),
    (10, 12, "Dussehra"),
    (11, 1, "Diwali"),
    (11, 15, "Kartik Purnima"),
];

const NOMINAL_SUNRISE: &str = "06:00";
const NOMINAL_SUNSET: &str = "18:00";

/// Minutes the moon rises later per tithi (12 degrees of elongation).
const MOONRISE_DRIFT_MINUTES: u32 = 48;

#[derive(Debug, Clone, Default)]
pub struct FallbackCalculator;

impl FallbackCalculator {
    pub fn new() -> Self {
        FallbackCalculator
    }

    /// One entry per day in `range`, the first day being Shukla Pratipada.
    pub fn calculate(&self, range: &DateRange) -> Vec<CalendarEntry> {
        range
            .days()
            .enumerate()
            .map(|(offset, date)| self.entry_for(offset, date))
            .collect()
    }

    fn entry_for(&self, offset: usize, date: NaiveDate) -> CalendarEntry {
        let index = (offset % TITHIS_PER_MONTH as usize) as u8 + 1;
        // `index` is always within 1..=30
        let (paksha, tithi_number) = split_tithi_index(index).unwrap_or((Paksha::Shukla, 1));
        let lunar_month = LunarMonth::approximate_for(date);
        let doy = day_of_year(date) as usize;
        let moonrise = moonrise_minutes(index);

        CalendarEntry {
            sequence_id: offset as u32 + 1,
            gregorian_date: date,
            lunar_date_label: lunar_date_label(lunar_month, paksha, tithi_number),
            tithi_number,
            paksha,
            lunar_month,
            nakshatra: NAKSHATRAS[doy % NAKSHATRAS.len()].to_string(),
            yoga: YOGAS[(doy + index as usize) % YOGAS.len()].to_string(),
            karana: karana_for(index).to_string(),
            sunrise: NOMINAL_SUNRISE.to_string(),
            sunset: NOMINAL_SUNSET.to_string(),
            moonrise: Some(format_minutes(moonrise)),
            moonset: Some(format_minutes(moonrise + 12 * 60)),
            festivals: festivals_on(date),
            is_leap_month: None,
            rahu_kalam: Some(kalam_window(rahu_segment(date.weekday()))),
            gulika_kalam: Some(kalam_window(gulika_segment(date.weekday()))),
        }
    }
}

#[async_trait]
impl PanchangSource for FallbackCalculator {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(
        &self,
        range: &DateRange,
        _location: &Location,
    ) -> PanchangResult<Vec<CalendarEntry>> {
        Ok(self.calculate(range))
    }
}

/// First karana of a tithi. Each tithi has two half-day karanas and only the
/// first is emitted: Kimstughna opens Shukla Pratipada, Chatushpada opens
/// Amavasya, and the rest cycle through the seven movable karanas.
pub fn karana_for(tithi_index: u8) -> &'static str {
    let half = (tithi_index as usize - 1) * 2;
    match half {
        0 => "Kimstughna",
        58 => "Chatushpada",
        n => MOVABLE_KARANAS[(n - 1) % MOVABLE_KARANAS.len()],
    }
}

pub fn festivals_on(date: NaiveDate) -> Vec<String> {
    FESTIVALS
        .iter()
        .filter(|(month, day, _)| *month == date.month() && *day == date.day())
        .map(|(_, _, name)| name.to_string())
        .collect()
}

/// The moon rises with the sun at Amavasya and drifts later each tithi.
fn moonrise_minutes(tithi_index: u8) -> u32 {
    (6 * 60 + tithi_index as u32 * MOONRISE_DRIFT_MINUTES) % (24 * 60)
}

fn format_minutes(minutes: u32) -> String {
    let minutes = minutes % (24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// 1-based eighth of the nominal 06:00–18:00 day.
fn rahu_segment(weekday: Weekday) -> u32 {
    match weekday {
        Weekday::Mon => 2,
        Weekday::Sat => 3,
        Weekday::Fri => 4,
        Weekday::Wed => 5,
        Weekday::Thu => 6,
        Weekday::Tue => 7,
        Weekday::Sun => 8,
    }
}

fn gulika_segment(weekday: Weekday) -> u32 {
    match weekday {
        Weekday::Sat => 1,
        Weekday::Fri => 2,
        Weekday::Thu => 3,
        Weekday::Wed => 4,
        Weekday::Tue => 5,
        Weekday::Mon => 6,
        Weekday::Sun => 7,
    }
}

/// "07:30-09:00" for segment 2.
fn kalam_window(segment: u32) -> String {
    let start = 6 * 60 + (segment - 1) * 90;
    format!("{}-{}", format_minutes(start), format_minutes(start + 90))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::from_args(start, Some(end)).unwrap()
    }

    #[test]
    fn test_three_day_range_starts_cycle_at_one() {
        let entries = FallbackCalculator::new().calculate(&range("2024-03-01", "2024-03-03"));

        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[0].gregorian_date < w[1].gregorian_date));
        let tithis: Vec<u8> = entries.iter().map(|e| e.tithi_number).collect();
        assert_eq!(tithis, vec![1, 2, 3]);
        assert!(entries.iter().all(|e| e.paksha == Paksha::Shukla));
        assert!(entries.iter().all(|e| e.validate().is_ok()));
    }

    #[test]
    fn test_cycle_wraps_after_thirty_days() {
        let entries = FallbackCalculator::new().calculate(&range("2024-01-01", "2024-02-15"));

        assert_eq!(entries.len(), 46);
        assert_eq!((entries[14].tithi_number, entries[14].paksha), (15, Paksha::Shukla));
        assert_eq!((entries[15].tithi_number, entries[15].paksha), (1, Paksha::Krishna));
        assert_eq!((entries[29].tithi_number, entries[29].paksha), (15, Paksha::Krishna));
        assert_eq!((entries[30].tithi_number, entries[30].paksha), (1, Paksha::Shukla));
        let ids: Vec<u32> = entries.iter().map(|e| e.sequence_id).collect();
        assert_eq!(ids, (1..=46).collect::<Vec<_>>());
    }

    #[test]
    fn test_nakshatra_follows_day_of_year() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entries = FallbackCalculator::new().calculate(&range("2024-01-01", "2024-01-28"));
        assert_eq!(entries[0].nakshatra, NAKSHATRAS[1]);
        assert_eq!(entries[26].nakshatra, NAKSHATRAS[0]);
        assert_eq!(entries[27].nakshatra, entries[0].nakshatra);
        assert_eq!(entries[0].gregorian_date, jan1);
    }

    #[test]
    fn test_festival_table_lookup() {
        let diwali = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let plain = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        assert_eq!(festivals_on(diwali), vec!["Diwali".to_string()]);
        assert!(festivals_on(plain).is_empty());
    }

    #[test]
    fn test_karana_sequence() {
        assert_eq!(karana_for(1), "Kimstughna");
        assert_eq!(karana_for(2), "Balava");
        assert_eq!(karana_for(8), "Vishti");
        assert_eq!(karana_for(30), "Chatushpada");
        // Shakuni and Naga only ever fall in a second half
        assert!((1..=30).all(|t| !["Shakuni", "Naga"].contains(&karana_for(t))));
    }

    #[test]
    fn test_kalam_windows_by_weekday() {
        // 2024-03-04 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let entries = FallbackCalculator::new().calculate(&DateRange::new(monday, monday).unwrap());
        assert_eq!(entries[0].rahu_kalam.as_deref(), Some("07:30-09:00"));
        assert_eq!(entries[0].gulika_kalam.as_deref(), Some("13:30-15:00"));
    }

    #[tokio::test]
    async fn test_fetch_never_fails() {
        let location = Location::new(19.076, 72.8777).unwrap();
        let entries = FallbackCalculator::new()
            .fetch(&range("2024-03-01", "2024-03-31"), &location)
            .await
            .unwrap();
        assert_eq!(entries.len(), 31);
    }
}
