//! Lunar calendar data model: tithis, pakshas and lunar months.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{TITHIS_PER_MONTH, TITHIS_PER_PAKSHA};
use crate::error::{PanchangError, PanchangResult};

/// Half of the lunar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paksha {
    /// Waxing half, new moon to full moon.
    Shukla,
    /// Waning half, full moon to new moon.
    Krishna,
}

impl Paksha {
    pub fn name(&self) -> &'static str {
        match self {
            Paksha::Shukla => "Shukla",
            Paksha::Krishna => "Krishna",
        }
    }

    pub fn is_waxing(&self) -> bool {
        matches!(self, Paksha::Shukla)
    }
}

impl fmt::Display for Paksha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The twelve lunar months, in order starting from Chaitra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LunarMonth {
    Chaitra,
    Vaishakha,
    Jyeshtha,
    Ashadha,
    Shravana,
    Bhadrapada,
    Ashwin,
    Kartika,
    Margashirsha,
    Pausha,
    Magha,
    Phalguna,
}

impl LunarMonth {
    pub const ALL: [LunarMonth; 12] = [
        LunarMonth::Chaitra,
        LunarMonth::Vaishakha,
        LunarMonth::Jyeshtha,
        LunarMonth::Ashadha,
        LunarMonth::Shravana,
        LunarMonth::Bhadrapada,
        LunarMonth::Ashwin,
        LunarMonth::Kartika,
        LunarMonth::Margashirsha,
        LunarMonth::Pausha,
        LunarMonth::Magha,
        LunarMonth::Phalguna,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LunarMonth::Chaitra => "Chaitra",
            LunarMonth::Vaishakha => "Vaishakha",
            LunarMonth::Jyeshtha => "Jyeshtha",
            LunarMonth::Ashadha => "Ashadha",
            LunarMonth::Shravana => "Shravana",
            LunarMonth::Bhadrapada => "Bhadrapada",
            LunarMonth::Ashwin => "Ashwin",
            LunarMonth::Kartika => "Kartika",
            LunarMonth::Margashirsha => "Margashirsha",
            LunarMonth::Pausha => "Pausha",
            LunarMonth::Magha => "Magha",
            LunarMonth::Phalguna => "Phalguna",
        }
    }

    /// Lunar month assigned purely from the Gregorian month of `date`.
    ///
    /// This is an approximation: it ignores new-moon boundaries and adhika
    /// (leap) months. January maps to Pausha, April to Chaitra, and so on.
    /// Changing it changes which festivals and month labels users see.
    pub fn approximate_for(date: NaiveDate) -> Self {
        // Gregorian month 1 (January) sits nine months after Chaitra
        let index = (date.month0() as usize + 9) % 12;
        LunarMonth::ALL[index]
    }
}

impl fmt::Display for LunarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const TITHI_NAMES: [&str; 14] = [
    "Pratipada",
    "Dwitiya",
    "Tritiya",
    "Chaturthi",
    "Panchami",
    "Shashthi",
    "Saptami",
    "Ashtami",
    "Navami",
    "Dashami",
    "Ekadashi",
    "Dwadashi",
    "Trayodashi",
    "Chaturdashi",
];

/// Traditional name of a tithi. The fifteenth is Purnima when waxing and
/// Amavasya when waning.
pub fn tithi_name(tithi_number: u8, paksha: Paksha) -> &'static str {
    match (tithi_number, paksha) {
        (15, Paksha::Shukla) => "Purnima",
        (15, Paksha::Krishna) => "Amavasya",
        (n @ 1..=14, _) => TITHI_NAMES[n as usize - 1],
        _ => "Unknown",
    }
}

/// Split a 1–30 tithi index into its paksha and 1–15 position.
///
/// 1–15 are Shukla, 16–30 are Krishna.
pub fn split_tithi_index(index: u8) -> PanchangResult<(Paksha, u8)> {
    match index {
        1..=TITHIS_PER_PAKSHA => Ok((Paksha::Shukla, index)),
        16..=TITHIS_PER_MONTH => Ok((Paksha::Krishna, index - TITHIS_PER_PAKSHA)),
        _ => Err(PanchangError::Fetch(format!(
            "tithi index {} is outside 1..=30",
            index
        ))),
    }
}

/// "Phalguna Shukla Ekadashi"
pub fn lunar_date_label(month: LunarMonth, paksha: Paksha, tithi_number: u8) -> String {
    format!("{} {} {}", month, paksha, tithi_name(tithi_number, paksha))
}

/// One lunar day as produced by a fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Position within the fetched batch, starting at 1.
    pub sequence_id: u32,
    pub gregorian_date: NaiveDate,
    pub lunar_date_label: String,
    /// 1–15, position within the paksha.
    pub tithi_number: u8,
    pub paksha: Paksha,
    pub lunar_month: LunarMonth,
    pub nakshatra: String,
    pub yoga: String,
    pub karana: String,
    pub sunrise: String,
    pub sunset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moonrise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moonset: Option<String>,
    /// Most significant first.
    #[serde(default)]
    pub festivals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_leap_month: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rahu_kalam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gulika_kalam: Option<String>,
}

impl CalendarEntry {
    /// Check the tithi bounds and that the label agrees with month, paksha and tithi.
    pub fn validate(&self) -> PanchangResult<()> {
        if !(1..=TITHIS_PER_PAKSHA).contains(&self.tithi_number) {
            return Err(PanchangError::Fetch(format!(
                "{}: tithi {} is outside 1..=15",
                self.gregorian_date, self.tithi_number
            )));
        }
        let expected = lunar_date_label(self.lunar_month, self.paksha, self.tithi_number);
        if self.lunar_date_label != expected {
            return Err(PanchangError::Fetch(format!(
                "{}: label '{}' does not match '{}'",
                self.gregorian_date, self.lunar_date_label, expected
            )));
        }
        Ok(())
    }

    /// Index within the full lunar month, 1–30.
    pub fn tithi_index(&self) -> u8 {
        match self.paksha {
            Paksha::Shukla => self.tithi_number,
            Paksha::Krishna => self.tithi_number + TITHIS_PER_PAKSHA,
        }
    }
}
