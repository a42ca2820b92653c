use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{holiday::HolidayCalendar, model::ScheduleItem};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        self.first_day()
            .iter_days()
            .take_while(move |day| day.month() == self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub holiday: Option<String>,
    pub schedule_count: usize,
    pub is_today: bool,
    pub is_sunday: bool,
}

impl CalendarDay {
    /// Sundays and holidays render in the "red day" style.
    pub fn is_rest_day(&self) -> bool {
        self.is_sunday || self.holiday.is_some()
    }
}

/// Sunday-first weeks; cells outside the month are `None`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthView {
    pub month: YearMonth,
    pub weeks: Vec<[Option<CalendarDay>; 7]>,
}

impl MonthView {
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.weeks
            .iter()
            .flat_map(|week| week.iter())
            .flatten()
            .find(|cell| cell.date == date)
    }
}

pub fn month_view(
    month: YearMonth,
    schedules: &[ScheduleItem],
    holidays: &dyn HolidayCalendar,
    today: NaiveDate,
) -> MonthView {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for schedule in schedules {
        if YearMonth::of(schedule.date) == month {
            *counts.entry(schedule.date).or_default() += 1;
        }
    }

    let mut weeks: Vec<[Option<CalendarDay>; 7]> = Vec::new();
    let mut week: [Option<CalendarDay>; 7] = Default::default();
    for date in month.days() {
        let column = date.weekday().num_days_from_sunday() as usize;
        week[column] = Some(CalendarDay {
            date,
            holiday: holidays.lookup(date),
            schedule_count: counts.get(&date).copied().unwrap_or(0),
            is_today: date == today,
            is_sunday: date.weekday() == Weekday::Sun,
        });
        if column == 6 {
            weeks.push(std::mem::take(&mut week));
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }

    MonthView { month, weeks }
}
