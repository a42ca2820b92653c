use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;

/// Entity awaiting a confirmed delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum DeleteTarget {
    Schedule(String),
    Routine(String),
    Todo(String),
    Memo(String),
}

/// Interactive state owned by the presentation layer and handed to each handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub selected_date: Option<NaiveDate>,
    pub calendar_month: YearMonth,
    pub pending_delete: Option<DeleteTarget>,
}

impl SessionContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_date: None,
            calendar_month: YearMonth::of(today),
            pending_delete: None,
        }
    }

    /// Selecting a day also moves the calendar to its month.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = Some(date);
        self.calendar_month = YearMonth::of(date);
    }

    pub fn clear_selection(&mut self) {
        self.selected_date = None;
    }

    pub fn next_month(&mut self) -> YearMonth {
        self.calendar_month = self.calendar_month.next();
        self.calendar_month
    }

    pub fn previous_month(&mut self) -> YearMonth {
        self.calendar_month = self.calendar_month.previous();
        self.calendar_month
    }

    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.pending_delete = Some(target);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn take_pending_delete(&mut self) -> Option<DeleteTarget> {
        self.pending_delete.take()
    }
}
