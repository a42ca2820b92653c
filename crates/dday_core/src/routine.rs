use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    completion::CompletionLog,
    countdown::weekday_index,
    model::{Frequency, Routine},
};

/// Namespace for feed ids synthesized from routine ids.
pub const ROUTINE_ID_PREFIX: &str = "routine-";

/// A routine due on a given day, shaped to sit in the feed next to schedules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineOccurrence {
    pub id: String,
    pub routine_id: String,
    pub title: String,
    pub date: NaiveDate,
}

/// A due routine together with whether it was checked off that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineCheck {
    pub routine: Routine,
    pub completed: bool,
}

pub fn is_due_on(routine: &Routine, day: NaiveDate) -> bool {
    if !routine.enabled {
        return false;
    }
    match routine.frequency {
        Frequency::Daily => true,
        Frequency::Weekly => routine.weekdays.contains(&weekday_index(day)),
    }
}

/// Enabled routines that occur on `today`, in stored order.
pub fn due_today(routines: &[Routine], today: NaiveDate) -> Vec<Routine> {
    routines
        .iter()
        .filter(|routine| is_due_on(routine, today))
        .cloned()
        .collect()
}

pub fn occurrence_id(routine_id: &str) -> String {
    format!("{ROUTINE_ID_PREFIX}{routine_id}")
}

pub fn to_feed_item(routine: &Routine, today: NaiveDate) -> RoutineOccurrence {
    RoutineOccurrence {
        id: occurrence_id(&routine.id),
        routine_id: routine.id.clone(),
        title: routine.title.clone(),
        date: today,
    }
}

/// Due routines not yet checked off on `today`, ready to merge into the feed.
pub fn pending_occurrences(
    routines: &[Routine],
    log: &CompletionLog,
    today: NaiveDate,
) -> Vec<RoutineOccurrence> {
    due_today(routines, today)
        .iter()
        .filter(|routine| !log.is_completed(&routine.id, today))
        .map(|routine| to_feed_item(routine, today))
        .collect()
}

/// Today's checklist: every due routine with its completion state.
pub fn checklist(routines: &[Routine], log: &CompletionLog, today: NaiveDate) -> Vec<RoutineCheck> {
    due_today(routines, today)
        .into_iter()
        .map(|routine| {
            let completed = log.is_completed(&routine.id, today);
            RoutineCheck { routine, completed }
        })
        .collect()
}
