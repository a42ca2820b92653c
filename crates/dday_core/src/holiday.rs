use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

/// Answers "is this date a holiday, and what is it called".
pub trait HolidayCalendar: Send + Sync {
    fn lookup(&self, date: NaiveDate) -> Option<String>;
}

impl<F> HolidayCalendar for F
where
    F: Fn(NaiveDate) -> Option<String> + Send + Sync,
{
    fn lookup(&self, date: NaiveDate) -> Option<String> {
        self(date)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn lookup(&self, _date: NaiveDate) -> Option<String> {
        None
    }
}

/// Table of holidays that recur on the same month/day every year plus
/// one-off dated entries (lunar holidays, substitute days). Dated entries win.
#[derive(Debug, Default, Clone)]
pub struct FixedHolidays {
    recurring: HashMap<(u32, u32), String>,
    dated: HashMap<NaiveDate, String>,
}

impl FixedHolidays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed-date public holidays of the Korean calendar.
    pub fn builtin() -> Self {
        Self::new()
            .with_recurring(1, 1, "New Year's Day")
            .with_recurring(3, 1, "Independence Movement Day")
            .with_recurring(5, 5, "Children's Day")
            .with_recurring(6, 6, "Memorial Day")
            .with_recurring(8, 15, "Liberation Day")
            .with_recurring(10, 3, "National Foundation Day")
            .with_recurring(10, 9, "Hangul Day")
            .with_recurring(12, 25, "Christmas Day")
    }

    pub fn with_recurring(mut self, month: u32, day: u32, name: impl Into<String>) -> Self {
        self.recurring.insert((month, day), name.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate, name: impl Into<String>) -> Self {
        self.dated.insert(date, name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.recurring.len() + self.dated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HolidayCalendar for FixedHolidays {
    fn lookup(&self, date: NaiveDate) -> Option<String> {
        self.dated
            .get(&date)
            .or_else(|| self.recurring.get(&(date.month(), date.day())))
            .cloned()
    }
}
