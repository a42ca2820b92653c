//! Per-day record of which routines were checked off.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days of completion history kept behind the day of the write.
pub const COMPLETION_HORIZON_DAYS: i64 = 7;

/// Calendar day → ids of routines completed that day. Serialized as a JSON
/// object keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CompletionLog {
    days: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl CompletionLog {
    pub fn is_completed(&self, routine_id: &str, day: NaiveDate) -> bool {
        self.days
            .get(&day)
            .map(|ids| ids.contains(routine_id))
            .unwrap_or(false)
    }

    /// Flips membership and returns the new state. A day left with no ids is
    /// dropped so that toggling twice restores the log exactly.
    pub fn toggle(&mut self, routine_id: &str, day: NaiveDate) -> bool {
        let ids = self.days.entry(day).or_default();
        let completed = if ids.remove(routine_id) {
            false
        } else {
            ids.insert(routine_id.to_string());
            true
        };
        if ids.is_empty() {
            self.days.remove(&day);
        }
        completed
    }

    pub fn completed_on(&self, day: NaiveDate) -> impl Iterator<Item = &str> {
        self.days
            .get(&day)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Copy of the log without any day strictly older than `day - horizon_days`.
    pub fn pruned(&self, day: NaiveDate, horizon_days: i64) -> CompletionLog {
        let cutoff = day - Duration::days(horizon_days);
        CompletionLog {
            days: self.days.range(cutoff..).map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    pub fn prune_before(&mut self, day: NaiveDate, horizon_days: i64) {
        let cutoff = day - Duration::days(horizon_days);
        self.days = self.days.split_off(&cutoff);
    }
}
