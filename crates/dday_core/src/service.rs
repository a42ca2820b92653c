use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{
    calendar::{month_view, MonthView, YearMonth},
    clock::{Clock, SystemClock},
    completion::{CompletionLog, COMPLETION_HORIZON_DAYS},
    countdown::{format_with_holiday, DisplayLocale},
    error::{Result, ValidationError},
    feed::{build_dashboard, Dashboard},
    holiday::{HolidayCalendar, NoHolidays},
    model::{new_id, required, Memo, Routine, RoutineDraft, ScheduleDraft, ScheduleItem, TodoItem},
    routine::{checklist, is_due_on, RoutineCheck},
    session::{DeleteTarget, SessionContext},
    store::{Collection, KeyValueStore, MemoryStore, Persistence},
};

/// Entry point for the presentation layer. Every read goes back to the store,
/// so edits are visible on the next call without any cache invalidation.
pub struct DdayService {
    persistence: Persistence,
    clock: Box<dyn Clock>,
    holidays: Box<dyn HolidayCalendar>,
}

pub struct DdayServiceBuilder {
    store: Option<Box<dyn KeyValueStore>>,
    clock: Box<dyn Clock>,
    holidays: Box<dyn HolidayCalendar>,
}

impl Default for DdayServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DdayServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: Box::new(SystemClock),
            holidays: Box::new(NoHolidays),
        }
    }

    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_holidays(mut self, holidays: impl HolidayCalendar + 'static) -> Self {
        self.holidays = Box::new(holidays);
        self
    }

    pub fn build(self) -> DdayService {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()) as Box<dyn KeyValueStore>);
        DdayService {
            persistence: Persistence::from_boxed(store),
            clock: self.clock,
            holidays: self.holidays,
        }
    }
}

impl DdayService {
    pub fn builder() -> DdayServiceBuilder {
        DdayServiceBuilder::new()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn dashboard(&self) -> Dashboard {
        let today = self.today();
        let dashboard = build_dashboard(
            &self.schedules(),
            &self.routines(),
            &self.completion_log(),
            today,
        );
        debug!(
            %today,
            entries = dashboard.entries.len(),
            total = dashboard.summary.total,
            "dashboard built"
        );
        dashboard
    }

    pub fn month_view(&self, month: YearMonth) -> MonthView {
        month_view(month, &self.schedules(), self.holidays.as_ref(), self.today())
    }

    pub fn display_date(&self, date: NaiveDate, locale: DisplayLocale) -> String {
        format_with_holiday(date, locale, self.holidays.as_ref())
    }

    // ----- schedules -----

    pub fn schedules(&self) -> Vec<ScheduleItem> {
        self.persistence.load(Collection::Schedules)
    }

    /// Schedules dated `date`, sorted by title.
    pub fn schedules_on(&self, date: NaiveDate) -> Vec<ScheduleItem> {
        let mut items: Vec<ScheduleItem> = self
            .schedules()
            .into_iter()
            .filter(|item| item.date == date)
            .collect();
        items.sort_by(|a, b| a.title.cmp(&b.title));
        items
    }

    pub fn add_schedule(&self, draft: ScheduleDraft) -> Result<ScheduleItem> {
        let item = draft.into_item(new_id())?;
        let mut items = self.schedules();
        items.push(item.clone());
        self.persistence.save(Collection::Schedules, &items);
        info!(id = %item.id, date = %item.date, "schedule added");
        Ok(item)
    }

    /// `Ok(None)` when the id no longer exists.
    pub fn update_schedule(&self, id: &str, draft: ScheduleDraft) -> Result<Option<ScheduleItem>> {
        let updated = draft.into_item(id.to_string())?;
        Ok(self.modify(Collection::Schedules, |items: &mut Vec<ScheduleItem>| {
            let slot = items.iter_mut().find(|item| item.id == id)?;
            *slot = updated.clone();
            Some(updated)
        }))
    }

    pub fn delete_schedule(&self, id: &str) -> bool {
        self.remove::<ScheduleItem>(Collection::Schedules, |item| item.id == id)
    }

    // ----- routines -----

    pub fn routines(&self) -> Vec<Routine> {
        self.persistence.load(Collection::Routines)
    }

    pub fn add_routine(&self, draft: RoutineDraft) -> Result<Routine> {
        let routine = draft.into_routine(new_id())?;
        let mut routines = self.routines();
        routines.push(routine.clone());
        self.persistence.save(Collection::Routines, &routines);
        info!(id = %routine.id, frequency = ?routine.frequency, "routine added");
        Ok(routine)
    }

    pub fn update_routine(&self, id: &str, draft: RoutineDraft) -> Result<Option<Routine>> {
        let updated = draft.into_routine(id.to_string())?;
        Ok(self.modify(Collection::Routines, |routines: &mut Vec<Routine>| {
            let slot = routines.iter_mut().find(|routine| routine.id == id)?;
            *slot = updated.clone();
            Some(updated)
        }))
    }

    /// Disabling keeps the routine and its completion history.
    pub fn set_routine_enabled(&self, id: &str, enabled: bool) -> bool {
        self.modify(Collection::Routines, |routines: &mut Vec<Routine>| {
            let routine = routines.iter_mut().find(|routine| routine.id == id)?;
            routine.enabled = enabled;
            Some(())
        })
        .is_some()
    }

    pub fn delete_routine(&self, id: &str) -> bool {
        self.remove::<Routine>(Collection::Routines, |routine| routine.id == id)
    }

    pub fn completion_log(&self) -> CompletionLog {
        self.persistence.load(Collection::RoutineCompletions)
    }

    /// Routines due today with their check-off state.
    pub fn today_routines(&self) -> Vec<RoutineCheck> {
        checklist(&self.routines(), &self.completion_log(), self.today())
    }

    /// Flips today's completion for a routine and returns the new state, or
    /// `None` when the routine is unknown or not due today. Old days are
    /// pruned on every save.
    pub fn toggle_routine(&self, routine_id: &str) -> Option<bool> {
        let today = self.today();
        let due = self
            .routines()
            .iter()
            .any(|routine| routine.id == routine_id && is_due_on(routine, today));
        if !due {
            debug!(routine_id, "toggle ignored for routine not due today");
            return None;
        }
        let mut log = self.completion_log();
        let completed = log.toggle(routine_id, today);
        log.prune_before(today, COMPLETION_HORIZON_DAYS);
        self.persistence.save(Collection::RoutineCompletions, &log);
        debug!(routine_id, completed, "routine completion toggled");
        Some(completed)
    }

    // ----- to-dos -----

    /// Open items first, newest first within each group.
    pub fn todos(&self) -> Vec<TodoItem> {
        let mut todos: Vec<TodoItem> = self.persistence.load(Collection::Todos);
        todos.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        todos
    }

    pub fn add_todo(&self, text: &str) -> Result<TodoItem> {
        let text = required(text, ValidationError::MissingText)?;
        let todo = TodoItem {
            id: new_id(),
            text,
            completed: false,
            created_at: self.clock.now(),
        };
        let mut todos: Vec<TodoItem> = self.persistence.load(Collection::Todos);
        todos.push(todo.clone());
        self.persistence.save(Collection::Todos, &todos);
        Ok(todo)
    }

    pub fn toggle_todo(&self, id: &str) -> Option<bool> {
        self.modify(Collection::Todos, |todos: &mut Vec<TodoItem>| {
            let todo = todos.iter_mut().find(|todo| todo.id == id)?;
            todo.completed = !todo.completed;
            Some(todo.completed)
        })
    }

    pub fn delete_todo(&self, id: &str) -> bool {
        self.remove::<TodoItem>(Collection::Todos, |todo| todo.id == id)
    }

    /// Returns how many completed items were removed.
    pub fn clear_completed_todos(&self) -> usize {
        self.modify(Collection::Todos, |todos: &mut Vec<TodoItem>| {
            let before = todos.len();
            todos.retain(|todo| !todo.completed);
            let removed = before - todos.len();
            (removed > 0).then_some(removed)
        })
        .unwrap_or(0)
    }

    // ----- memos -----

    /// Most recently updated first.
    pub fn memos(&self) -> Vec<Memo> {
        let mut memos: Vec<Memo> = self.persistence.load(Collection::Memos);
        memos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        memos
    }

    pub fn add_memo(&self, title: &str, content: &str) -> Result<Memo> {
        let title = required(title, ValidationError::MissingTitle)?;
        let now = self.clock.now();
        let memo = Memo {
            id: new_id(),
            title,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut memos: Vec<Memo> = self.persistence.load(Collection::Memos);
        memos.push(memo.clone());
        self.persistence.save(Collection::Memos, &memos);
        Ok(memo)
    }

    pub fn update_memo(&self, id: &str, title: &str, content: &str) -> Result<Option<Memo>> {
        let title = required(title, ValidationError::MissingTitle)?;
        let now = self.clock.now();
        Ok(self.modify(Collection::Memos, |memos: &mut Vec<Memo>| {
            let memo = memos.iter_mut().find(|memo| memo.id == id)?;
            memo.title = title;
            memo.content = content.to_string();
            memo.updated_at = now;
            Some(memo.clone())
        }))
    }

    pub fn delete_memo(&self, id: &str) -> bool {
        self.remove::<Memo>(Collection::Memos, |memo| memo.id == id)
    }

    // ----- session -----

    /// Executes and clears the session's pending delete. `false` when nothing
    /// was pending or the target was already gone.
    pub fn confirm_delete(&self, session: &mut SessionContext) -> bool {
        let Some(target) = session.take_pending_delete() else {
            return false;
        };
        match &target {
            DeleteTarget::Schedule(id) => self.delete_schedule(id),
            DeleteTarget::Routine(id) => self.delete_routine(id),
            DeleteTarget::Todo(id) => self.delete_todo(id),
            DeleteTarget::Memo(id) => self.delete_memo(id),
        }
    }
}

impl DdayService {
    /// Load, apply `f`, and save only when `f` reports a change.
    fn modify<T, R>(&self, collection: Collection, f: impl FnOnce(&mut Vec<T>) -> Option<R>) -> Option<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items: Vec<T> = self.persistence.load(collection);
        let outcome = f(&mut items);
        if outcome.is_some() {
            self.persistence.save(collection, &items);
        } else {
            debug!(%collection, "no matching record, nothing saved");
        }
        outcome
    }

    fn remove<T>(&self, collection: Collection, matches: impl Fn(&T) -> bool) -> bool
    where
        T: Serialize + DeserializeOwned,
    {
        self.modify(collection, |items: &mut Vec<T>| {
            let before = items.len();
            items.retain(|item| !matches(item));
            (items.len() < before).then_some(())
        })
        .is_some()
    }
}
