use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One-off deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

/// Recurring task definition. Weekdays use 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub title: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub weekdays: BTreeSet<u8>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated schedule input as it arrives from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub memo: Option<String>,
}

impl ScheduleDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date: Some(date),
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn into_item(self, id: String) -> Result<ScheduleItem, ValidationError> {
        let title = required(&self.title, ValidationError::MissingTitle)?;
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        let memo = self
            .memo
            .map(|memo| memo.trim().to_string())
            .filter(|memo| !memo.is_empty());
        Ok(ScheduleItem {
            id,
            title,
            date,
            memo,
        })
    }
}

/// Unvalidated routine input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDraft {
    pub title: String,
    pub frequency: Frequency,
    pub weekdays: Vec<u8>,
    pub enabled: bool,
}

impl RoutineDraft {
    pub fn daily(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            frequency: Frequency::Daily,
            weekdays: Vec::new(),
            enabled: true,
        }
    }

    pub fn weekly(title: impl Into<String>, weekdays: impl IntoIterator<Item = u8>) -> Self {
        Self {
            title: title.into(),
            frequency: Frequency::Weekly,
            weekdays: weekdays.into_iter().collect(),
            enabled: true,
        }
    }

    pub fn into_routine(self, id: String) -> Result<Routine, ValidationError> {
        let title = required(&self.title, ValidationError::MissingTitle)?;
        let weekdays = match self.frequency {
            // weekdays are meaningless for daily routines
            Frequency::Daily => BTreeSet::new(),
            Frequency::Weekly => {
                if let Some(day) = self.weekdays.iter().copied().find(|day| *day > 6) {
                    return Err(ValidationError::WeekdayOutOfRange(day));
                }
                let days: BTreeSet<u8> = self.weekdays.into_iter().collect();
                if days.is_empty() {
                    return Err(ValidationError::NoWeekdaySelected);
                }
                days
            }
        };
        Ok(Routine {
            id,
            title,
            frequency: self.frequency,
            weekdays,
            enabled: self.enabled,
        })
    }
}

pub(crate) fn required(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
