//! Terminal rendering for panchang results.
//!
//! Extension traits add colored output to panchang-core types using owo_colors.

use chrono::{Datelike, Local, NaiveDate};
use owo_colors::OwoColorize;
use panchang_core::{Auspiciousness, DataSource, EnrichedCalendarDay, Paksha, RangeResult};

const UNAVAILABLE: &str = "Data temporarily unavailable";

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DataSource {
    fn render(&self) -> String {
        let tag = format!("[{}]", self);
        match self {
            DataSource::Cache => tag.dimmed().to_string(),
            DataSource::Primary => tag.cyan().to_string(),
            DataSource::Fallback => tag.yellow().to_string(),
        }
    }
}

/// Colorize text according to how auspicious the day is
fn colorize(auspiciousness: Auspiciousness, text: &str) -> String {
    match auspiciousness {
        Auspiciousness::Favorable => text.green().to_string(),
        Auspiciousness::Unfavorable => text.red().to_string(),
        Auspiciousness::Mixed => text.to_string(),
    }
}

impl Render for EnrichedCalendarDay {
    fn render(&self) -> String {
        let entry = &self.entry;
        let label = format!("{:<12}", format_date_label(entry.gregorian_date, today()));
        let label = if self.is_today {
            label.bold().to_string()
        } else {
            label
        };

        format!(
            "{} {} {} {}",
            label,
            moon_glyph(self),
            colorize(self.auspiciousness, &entry.lunar_date_label),
            entry.nakshatra.dimmed()
        )
    }
}

/// Print every day, one line each, with festivals underneath.
pub fn print_range(result: &RangeResult) {
    if !result.success {
        println!("{}", UNAVAILABLE.red());
        return;
    }

    let mut current_month: Option<(i32, u32)> = None;
    for day in &result.entries {
        let date = day.entry.gregorian_date;
        let month = (date.year(), date.month());
        if current_month != Some(month) {
            if current_month.is_some() {
                println!();
            }
            println!("{}", date.format("%B %Y").to_string().bold());
            current_month = Some(month);
        }

        println!("  {}", day.render());
        for festival in &day.entry.festivals {
            println!("                 {} {}", "✦".yellow(), festival.yellow());
        }
    }

    println!();
    println!(
        "{} {}",
        format!("{} days", result.entries.len()).dimmed(),
        result.source.render()
    );
}

/// Print a single day with its timings.
pub fn print_day_detail(result: &RangeResult) {
    let Some(day) = result.entries.first().filter(|_| result.success) else {
        println!("{}", UNAVAILABLE.red());
        return;
    };
    let entry = &day.entry;

    println!(
        "{} {}",
        entry.gregorian_date.format("%A %-d %B %Y").to_string().bold(),
        result.source.render()
    );
    println!(
        "  {} {}",
        moon_glyph(day),
        colorize(day.auspiciousness, &entry.lunar_date_label)
    );
    if entry.is_leap_month == Some(true) {
        println!("  {}", "Adhika masa".yellow());
    }
    println!();

    let rows = [
        ("Nakshatra", Some(entry.nakshatra.as_str())),
        ("Yoga", Some(entry.yoga.as_str())),
        ("Karana", Some(entry.karana.as_str())),
        ("Sunrise", Some(entry.sunrise.as_str())),
        ("Sunset", Some(entry.sunset.as_str())),
        ("Moonrise", entry.moonrise.as_deref()),
        ("Moonset", entry.moonset.as_deref()),
        ("Rahu kalam", entry.rahu_kalam.as_deref()),
        ("Gulika kalam", entry.gulika_kalam.as_deref()),
    ];
    for (name, value) in rows {
        if let Some(value) = value {
            println!("  {:<13}{}", name.dimmed(), value);
        }
    }
    println!(
        "  {:<13}{:.0}%",
        "Illumination".dimmed(),
        day.moon_illumination_percent
    );

    if !entry.festivals.is_empty() {
        println!();
        for festival in &entry.festivals {
            println!("  {} {}", "✦".yellow(), festival.yellow());
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

fn moon_glyph(day: &EnrichedCalendarDay) -> &'static str {
    if day.is_full_moon {
        return "🌕";
    }
    if day.is_new_moon {
        return "🌑";
    }
    let waxing = day.entry.paksha == Paksha::Shukla;
    match (waxing, day.moon_illumination_percent) {
        (true, p) if p < 40.0 => "🌒",
        (true, p) if p < 60.0 => "🌓",
        (true, _) => "🌔",
        (false, p) if p > 60.0 => "🌖",
        (false, p) if p > 40.0 => "🌗",
        (false, _) => "🌘",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_labels() {
        let today = date("2024-03-25");
        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(date("2024-03-26"), today), "Tomorrow");
        assert_eq!(format_date_label(date("2024-03-28"), today), "Thu Mar 28");
        assert_eq!(format_date_label(date("2024-03-24"), today), "Sun Mar 24");
    }
}
