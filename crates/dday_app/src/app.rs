use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use dday_core::{
    calendar::{MonthView, YearMonth},
    clock::SystemClock,
    countdown::{format_countdown, format_for_display, DisplayLocale, Urgency},
    feed::{Dashboard, FeedKind},
    holiday::FixedHolidays,
    routine::RoutineCheck,
    store::FileStore,
    DdayService,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidaySource {
    Builtin,
    None,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) locale: DisplayLocale,
    pub(crate) holidays: HolidaySource,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("DDAY_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(locale) = std::env::var("DDAY_LOCALE") {
            config.locale = locale
                .parse::<DisplayLocale>()
                .map_err(anyhow::Error::msg)
                .context("DDAY_LOCALE")?;
        }
        if let Ok(source) = std::env::var("DDAY_HOLIDAYS") {
            config.holidays = match source.trim().to_ascii_lowercase().as_str() {
                "builtin" | "" => HolidaySource::Builtin,
                "none" | "off" => HolidaySource::None,
                other => bail!("DDAY_HOLIDAYS: unsupported value `{other}`"),
            };
        }
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    fn holiday_calendar(&self) -> FixedHolidays {
        match self.holidays {
            HolidaySource::Builtin => FixedHolidays::builtin(),
            HolidaySource::None => FixedHolidays::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dday-data"),
            locale: DisplayLocale::En,
            holidays: HolidaySource::Builtin,
        }
    }
}

pub fn build_service(config: &AppConfig) -> DdayService {
    info!(data_dir = %config.data_dir.display(), locale = %config.locale, "opening local store");
    DdayService::builder()
        .with_store(FileStore::new(&config.data_dir))
        .with_clock(SystemClock)
        .with_holidays(config.holiday_calendar())
        .build()
}

pub fn run(config: AppConfig) -> Result<()> {
    let start = Instant::now();
    let service = build_service(&config);
    let screen = render_screen(&service, config.locale).context("failed to render dashboard")?;
    print!("{screen}");
    info!(elapsed_ms = %start.elapsed().as_millis(), "dashboard rendered");
    Ok(())
}

pub fn render_screen(service: &DdayService, locale: DisplayLocale) -> Result<String> {
    let today = service.today();
    let mut out = String::new();
    writeln!(out, "{}", format_day_heading(service, today, locale))?;
    writeln!(out)?;
    out.push_str(&render_dashboard(&service.dashboard(), locale)?);
    writeln!(out)?;
    out.push_str(&render_routines(&service.today_routines())?);
    writeln!(out)?;
    out.push_str(&render_month(&service.month_view(YearMonth::of(today)))?);
    debug!(bytes = out.len(), "screen composed");
    Ok(out)
}

fn format_day_heading(service: &DdayService, today: NaiveDate, locale: DisplayLocale) -> String {
    let label = service.display_date(today, locale);
    format!("Today: {label}")
}

pub fn render_dashboard(dashboard: &Dashboard, locale: DisplayLocale) -> Result<String> {
    let summary = dashboard.summary;
    let mut out = String::new();
    writeln!(
        out,
        "Total {} · Today {} · Urgent {} · Overdue {}",
        summary.total, summary.today, summary.urgent, summary.overdue
    )?;
    if dashboard.entries.is_empty() {
        writeln!(out, "  Nothing scheduled.")?;
    }
    for entry in &dashboard.entries {
        let marker = match entry.urgency {
            Urgency::Overdue => "!",
            Urgency::Today => "*",
            Urgency::Urgent => "+",
            Urgency::Normal => " ",
        };
        let label = match &entry.item {
            FeedKind::Schedule(schedule) => match &schedule.memo {
                Some(memo) => format!("{} ({memo})", schedule.title),
                None => schedule.title.clone(),
            },
            FeedKind::RoutineOccurrence(occurrence) => format!("Routine · {}", occurrence.title),
        };
        writeln!(
            out,
            "{marker} {:>6}  {:<14} {label}",
            format_countdown(entry.days_remaining),
            format_for_display(entry.date(), locale),
        )?;
    }
    Ok(out)
}

pub fn render_routines(checks: &[RoutineCheck]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Routines today")?;
    if checks.is_empty() {
        writeln!(out, "  None due.")?;
    }
    for check in checks {
        let mark = if check.completed { "x" } else { " " };
        writeln!(out, "  [{mark}] {}", check.routine.title)?;
    }
    Ok(out)
}

/// Sunday-first grid; `*` marks days with schedules, `h` holidays, `[]` today.
pub fn render_month(view: &MonthView) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", view.month)?;
    writeln!(out, " Sun  Mon  Tue  Wed  Thu  Fri  Sat")?;
    for week in &view.weeks {
        for cell in week {
            match cell {
                Some(day) => {
                    let number = day.date.day();
                    let flag = if day.schedule_count > 0 {
                        '*'
                    } else if day.holiday.is_some() {
                        'h'
                    } else {
                        ' '
                    };
                    if day.is_today {
                        write!(out, "[{number:>2}]{flag}")?;
                    } else {
                        write!(out, " {number:>2} {flag}")?;
                    }
                }
                None => out.push_str("     "),
            }
        }
        writeln!(out)?;
    }
    let holidays: Vec<String> = view
        .weeks
        .iter()
        .flat_map(|week| week.iter())
        .flatten()
        .filter_map(|day| {
            day.holiday
                .as_ref()
                .map(|name| format!("  {} {name}", day.date.format("%m-%d")))
        })
        .collect();
    for line in holidays {
        writeln!(out, "{line}")?;
    }
    Ok(out)
}
