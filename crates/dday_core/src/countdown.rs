//! Day arithmetic and urgency buckets shared by the dashboard counts and the
//! list styling.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::holiday::HolidayCalendar;

/// Upper bound (inclusive) of the urgent bucket.
pub const URGENT_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Overdue,
    Today,
    Urgent,
    Normal,
}

/// Whole calendar days from `today` until `date`. Negative once the date has passed.
pub fn days_remaining(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

pub fn classify_urgency(days: i64) -> Urgency {
    match days {
        d if d < 0 => Urgency::Overdue,
        0 => Urgency::Today,
        d if d <= URGENT_WINDOW_DAYS => Urgency::Urgent,
        _ => Urgency::Normal,
    }
}

/// `D-Day`, `D-3` (three days left) or `D+2` (two days past).
pub fn format_countdown(days: i64) -> String {
    match days {
        0 => "D-Day".to_string(),
        d if d > 0 => format!("D-{d}"),
        d => format!("D+{}", -d),
    }
}

/// Sunday = 0 through Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLocale {
    #[default]
    En,
    Ko,
}

impl DisplayLocale {
    pub fn weekday_abbrev(self, weekday: Weekday) -> &'static str {
        const EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        const KO: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];
        let idx = weekday.num_days_from_sunday() as usize;
        match self {
            DisplayLocale::En => EN[idx],
            DisplayLocale::Ko => KO[idx],
        }
    }
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(DisplayLocale::En),
            "ko" | "ko-kr" | "ko_kr" => Ok(DisplayLocale::Ko),
            other => Err(format!("unsupported locale `{other}`")),
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayLocale::En => f.write_str("en"),
            DisplayLocale::Ko => f.write_str("ko"),
        }
    }
}

/// Month, day and weekday abbreviation, e.g. `Oct 16 (Fri)` or `10월 16일 (금)`.
pub fn format_for_display(date: NaiveDate, locale: DisplayLocale) -> String {
    let weekday = locale.weekday_abbrev(date.weekday());
    match locale {
        DisplayLocale::En => format!("{} ({weekday})", date.format("%b %-d")),
        DisplayLocale::Ko => format!("{}월 {}일 ({weekday})", date.month(), date.day()),
    }
}

/// Display label with the holiday name appended when the calendar knows one.
pub fn format_with_holiday(
    date: NaiveDate,
    locale: DisplayLocale,
    holidays: &dyn HolidayCalendar,
) -> String {
    let base = format_for_display(date, locale);
    match holidays.lookup(date) {
        Some(name) => format!("{base} · {name}"),
        None => base,
    }
}
