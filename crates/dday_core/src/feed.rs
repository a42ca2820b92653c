//! Merges one-off deadlines with today's routine occurrences into the ranked
//! feed shown on the dashboard, plus the summary counts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    completion::CompletionLog,
    countdown::{classify_urgency, days_remaining, Urgency},
    model::{Routine, ScheduleItem},
    routine::{pending_occurrences, RoutineOccurrence},
};

/// Schedules overdue by more than this many days are hidden (never deleted).
pub const OVERDUE_RETENTION_DAYS: i64 = 14;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedKind {
    Schedule(ScheduleItem),
    RoutineOccurrence(RoutineOccurrence),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub days_remaining: i64,
    pub urgency: Urgency,
    pub item: FeedKind,
}

impl FeedEntry {
    fn new(item: FeedKind, today: NaiveDate) -> Self {
        let days = days_remaining(Self::date_of(&item), today);
        Self {
            days_remaining: days,
            urgency: classify_urgency(days),
            item,
        }
    }

    fn date_of(item: &FeedKind) -> NaiveDate {
        match item {
            FeedKind::Schedule(schedule) => schedule.date,
            FeedKind::RoutineOccurrence(occurrence) => occurrence.date,
        }
    }

    pub fn id(&self) -> &str {
        match &self.item {
            FeedKind::Schedule(schedule) => &schedule.id,
            FeedKind::RoutineOccurrence(occurrence) => &occurrence.id,
        }
    }

    pub fn title(&self) -> &str {
        match &self.item {
            FeedKind::Schedule(schedule) => &schedule.title,
            FeedKind::RoutineOccurrence(occurrence) => &occurrence.title,
        }
    }

    pub fn date(&self) -> NaiveDate {
        Self::date_of(&self.item)
    }

    pub fn is_routine(&self) -> bool {
        matches!(self.item, FeedKind::RoutineOccurrence(_))
    }
}

/// Counts over visible schedule items only; routine occurrences are excluded.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FeedSummary {
    pub total: usize,
    pub today: usize,
    pub urgent: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Dashboard {
    pub entries: Vec<FeedEntry>,
    pub summary: FeedSummary,
}

pub fn is_visible(days: i64) -> bool {
    days >= -OVERDUE_RETENTION_DAYS
}

/// Schedules still inside the overdue retention window, in stored order.
pub fn visible_schedules(schedules: &[ScheduleItem], today: NaiveDate) -> Vec<ScheduleItem> {
    schedules
        .iter()
        .filter(|schedule| is_visible(days_remaining(schedule.date, today)))
        .cloned()
        .collect()
}

pub fn summarize(schedules: &[ScheduleItem], today: NaiveDate) -> FeedSummary {
    let mut summary = FeedSummary::default();
    for schedule in schedules {
        let days = days_remaining(schedule.date, today);
        if !is_visible(days) {
            continue;
        }
        summary.total += 1;
        match classify_urgency(days) {
            Urgency::Overdue => summary.overdue += 1,
            Urgency::Today => summary.today += 1,
            Urgency::Urgent => summary.urgent += 1,
            Urgency::Normal => {}
        }
    }
    summary
}

/// Visible schedules followed by routine occurrences, stably sorted by days
/// remaining so schedules precede routines on equal days.
pub fn build_feed(
    schedules: &[ScheduleItem],
    occurrences: &[RoutineOccurrence],
    today: NaiveDate,
) -> Vec<FeedEntry> {
    let mut entries: Vec<FeedEntry> = visible_schedules(schedules, today)
        .into_iter()
        .map(|schedule| FeedEntry::new(FeedKind::Schedule(schedule), today))
        .chain(
            occurrences
                .iter()
                .cloned()
                .map(|occurrence| FeedEntry::new(FeedKind::RoutineOccurrence(occurrence), today)),
        )
        .collect();
    entries.sort_by_key(|entry| entry.days_remaining);
    entries
}

pub fn build_dashboard(
    schedules: &[ScheduleItem],
    routines: &[Routine],
    log: &CompletionLog,
    today: NaiveDate,
) -> Dashboard {
    let occurrences = pending_occurrences(routines, log, today);
    Dashboard {
        entries: build_feed(schedules, &occurrences, today),
        summary: summarize(schedules, today),
    }
}
