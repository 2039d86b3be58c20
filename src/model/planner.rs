use chrono::NaiveDate;
use uuid::Uuid;

use super::book::TaskBook;
use super::calendar::{self, MonthGrid};
use super::filter::Filters;
use super::gesture::{GestureOutcome, GestureResolver, PointerTarget, TaskEdit};
use super::layout::{layout_weeks, WeekRow};
use super::task::{Category, Task};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::io::store::{self, KeyValueStore};

/// Fields collected by the task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub category: Category,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TaskDraft {
    fn validate(&self) -> Result<String, PlannerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyName);
        }
        if self.start > self.end {
            return Err(PlannerError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(name.to_string())
    }
}

/// Owns the task book, filters, displayed month and the gesture in flight.
///
/// Every mutation goes through here and is followed by a best-effort write of
/// the whole snapshot.
pub struct Planner {
    book: TaskBook,
    pub filters: Filters,
    anchor: NaiveDate,
    gestures: GestureResolver,
    store: Box<dyn KeyValueStore>,
    storage_key: String,
    last_store_error: Option<String>,
}

impl Planner {
    /// Load the snapshot from `store`, falling back to sample tasks (first
    /// run, if configured) or an empty book.
    pub fn open(store: Box<dyn KeyValueStore>, config: &PlannerConfig, today: NaiveDate) -> Self {
        let book = match store::load_book(store.as_ref(), &config.storage_key) {
            Ok(Some(book)) => {
                tracing::info!(
                    tasks = book.len(),
                    key = %config.storage_key,
                    "loaded task snapshot"
                );
                book
            }
            Ok(None) if config.seed_sample_tasks => {
                tracing::info!("no task snapshot; starting with sample tasks");
                TaskBook::sample(today)
            }
            Ok(None) => TaskBook::default(),
            Err(e) => {
                tracing::warn!(error = %e, "task snapshot unreadable; starting empty");
                TaskBook::default()
            }
        };
        Self::with_book(book, store, &config.storage_key, today)
    }

    pub fn with_book(
        book: TaskBook,
        store: Box<dyn KeyValueStore>,
        storage_key: &str,
        today: NaiveDate,
    ) -> Self {
        Self {
            book,
            filters: Filters::default(),
            anchor: today,
            gestures: GestureResolver::new(),
            store,
            storage_key: storage_key.to_string(),
            last_store_error: None,
        }
    }

    // --- Queries ---

    pub fn tasks(&self) -> &[Task] {
        &self.book.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.book.get(id)
    }

    pub fn gestures(&self) -> &GestureResolver {
        &self.gestures
    }

    /// Message from the most recent failed save, cleared by the next success.
    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    pub fn visible_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.filters.apply(&self.book.tasks, today).collect()
    }

    // --- Month navigation ---

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::for_anchor(self.anchor)
    }

    /// Filtered tasks laid out on the displayed month.
    pub fn layout(&self, today: NaiveDate) -> Vec<WeekRow> {
        layout_weeks(self.filters.apply(&self.book.tasks, today), &self.grid())
    }

    pub fn show_month_of(&mut self, day: NaiveDate) {
        self.anchor = day;
    }

    pub fn previous_month(&mut self) {
        self.anchor = calendar::previous_month_anchor(self.anchor);
    }

    pub fn next_month(&mut self) {
        self.anchor = calendar::next_month_anchor(self.anchor);
    }

    // --- Mutations ---

    pub fn create(&mut self, draft: TaskDraft) -> Result<Uuid, PlannerError> {
        let name = draft.validate()?;
        let task = Task::new(name, draft.category, draft.start, draft.end);
        let id = task.id;
        tracing::debug!(%id, start = %task.start, end = %task.end, "task created");
        self.book.tasks.push(task);
        self.persist();
        Ok(id)
    }

    pub fn update(&mut self, id: Uuid, draft: TaskDraft) -> Result<(), PlannerError> {
        let name = draft.validate()?;
        let task = self.book.get_mut(id).ok_or(PlannerError::TaskNotFound(id))?;
        task.name = name;
        task.category = draft.category;
        task.start = draft.start;
        task.end = draft.end;
        self.persist();
        Ok(())
    }

    /// Shift a task by whole days. Unknown ids and shifts past the
    /// representable calendar are ignored.
    pub fn move_by(&mut self, id: Uuid, delta_days: i64) -> bool {
        let Some(task) = self.book.get_mut(id) else {
            tracing::debug!(%id, "move of missing task ignored");
            return false;
        };
        if delta_days == 0 || !task.shift(delta_days) {
            return false;
        }
        self.persist();
        true
    }

    /// Replace a task's range. Inverted ranges and unknown ids are ignored.
    pub fn resize(&mut self, id: Uuid, start: NaiveDate, end: NaiveDate) -> bool {
        if start > end {
            return false;
        }
        let Some(task) = self.book.get_mut(id) else {
            tracing::debug!(%id, "resize of missing task ignored");
            return false;
        };
        if (task.start, task.end) == (start, end) {
            return false;
        }
        task.start = start;
        task.end = end;
        self.persist();
        true
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.book.len();
        self.book.tasks.retain(|t| t.id != id);
        let removed = self.book.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.book.tasks.clear();
        self.gestures.cancel();
        self.persist();
    }

    /// Apply an edit produced by the gesture resolver.
    pub fn apply(&mut self, edit: TaskEdit) -> bool {
        match edit {
            TaskEdit::Create {
                name,
                category,
                start,
                end,
            } => match self.create(TaskDraft {
                name,
                category,
                start,
                end,
            }) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(error = %e, "create rejected");
                    false
                }
            },
            TaskEdit::Move { id, delta_days } => self.move_by(id, delta_days),
            TaskEdit::Resize { id, start, end } => self.resize(id, start, end),
        }
    }

    // --- Gestures ---

    pub fn set_pixels_per_day(&mut self, pixels: f32) {
        self.gestures.set_pixels_per_day(pixels);
    }

    pub fn pointer_down(&mut self, target: PointerTarget, x: f32) {
        self.gestures.pointer_down(target, x, &self.book.tasks);
    }

    pub fn pointer_enter(&mut self, day: NaiveDate) {
        self.gestures.pointer_enter(day);
    }

    pub fn pointer_leave(&mut self) {
        self.gestures.pointer_leave();
    }

    /// Returns whether a live resize changed the task book.
    pub fn pointer_move(&mut self, x: f32) -> bool {
        let outcome = self.gestures.pointer_move(x, &self.book.tasks);
        self.resolve(outcome).unwrap_or(false)
    }

    /// Finish the gesture. Edits are applied; form/click requests are returned.
    pub fn pointer_up(&mut self, drop_day: Option<NaiveDate>) -> GestureOutcome {
        let outcome = self.gestures.pointer_up(drop_day);
        match outcome {
            GestureOutcome::Edit(edit) => {
                self.apply(edit);
                GestureOutcome::None
            }
            other => other,
        }
    }

    /// Confirm the drag-selected range with a name and category.
    pub fn submit_selection(&mut self, name: &str, category: Category) -> Result<(), PlannerError> {
        let outcome = self.gestures.submit(name, category)?;
        self.resolve(outcome);
        Ok(())
    }

    /// Abandon the gesture in flight without keeping any of its edits.
    pub fn cancel_gesture(&mut self) {
        let outcome = self.gestures.cancel();
        self.resolve(outcome);
    }

    fn resolve(&mut self, outcome: GestureOutcome) -> Option<bool> {
        match outcome {
            GestureOutcome::Edit(edit) => Some(self.apply(edit)),
            _ => None,
        }
    }

    fn persist(&mut self) {
        match store::save_book(self.store.as_mut(), &self.storage_key, &self.book) {
            Ok(()) => self.last_store_error = None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save tasks; keeping changes in memory");
                self.last_store_error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::memory::MemoryStore;
    use crate::io::store::FileStore;
    use crate::model::gesture::Edge;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const KEY: &str = "tasks";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn planner_with(tasks: Vec<Task>) -> Planner {
        Planner::with_book(
            TaskBook::new(tasks),
            Box::new(MemoryStore::default()),
            KEY,
            day(2024, 6, 15),
        )
    }

    fn draft(name: &str, start: NaiveDate, end: NaiveDate) -> TaskDraft {
        TaskDraft {
            name: name.into(),
            category: Category::ToDo,
            start,
            end,
        }
    }

    #[test]
    fn open_seeds_samples_on_first_run() {
        let config = PlannerConfig::default();
        let planner = Planner::open(Box::new(MemoryStore::default()), &config, day(2024, 6, 15));
        assert!(!planner.tasks().is_empty());

        let config = PlannerConfig {
            seed_sample_tasks: false,
            ..PlannerConfig::default()
        };
        let planner = Planner::open(Box::new(MemoryStore::default()), &config, day(2024, 6, 15));
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn open_with_corrupt_snapshot_starts_empty() {
        let config = PlannerConfig::default();
        let mut store = MemoryStore::default();
        store.entries.insert(config.storage_key.clone(), "{".into());
        let planner = Planner::open(Box::new(store), &config, day(2024, 6, 15));
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn mutations_are_persisted_and_reloadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut planner =
            Planner::with_book(TaskBook::default(), Box::new(store), KEY, day(2024, 6, 15));
        let id = planner.create(draft("Design", day(2024, 6, 1), day(2024, 6, 3))).unwrap();
        assert!(planner.move_by(id, 2));
        assert_eq!(planner.last_store_error(), None);

        let reloaded = store::load_book(&FileStore::new(dir.path()), KEY).unwrap().unwrap();
        let task = reloaded.get(id).unwrap();
        assert_eq!((task.start, task.end), (day(2024, 6, 3), day(2024, 6, 5)));
    }

    #[test]
    fn store_failures_keep_memory_state() {
        let store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let mut planner =
            Planner::with_book(TaskBook::default(), Box::new(store), KEY, day(2024, 6, 15));
        let id = planner.create(draft("Offline", day(2024, 6, 1), day(2024, 6, 1))).unwrap();
        assert!(planner.get(id).is_some());
        assert!(planner.last_store_error().is_some());
    }

    #[test]
    fn create_and_update_validate_input() {
        let mut planner = planner_with(vec![]);
        assert_eq!(
            planner.create(draft("   ", day(2024, 6, 1), day(2024, 6, 1))),
            Err(PlannerError::EmptyName)
        );
        let id = planner.create(draft("  Plan  ", day(2024, 6, 1), day(2024, 6, 1))).unwrap();
        assert_eq!(planner.get(id).unwrap().name, "Plan");

        assert_eq!(
            planner.update(id, draft("Plan", day(2024, 6, 9), day(2024, 6, 2))),
            Err(PlannerError::InvalidRange { start: day(2024, 6, 9), end: day(2024, 6, 2) })
        );
        let ghost = Uuid::new_v4();
        assert_eq!(
            planner.update(ghost, draft("x", day(2024, 6, 1), day(2024, 6, 1))),
            Err(PlannerError::TaskNotFound(ghost))
        );

        let edit = TaskDraft {
            category: Category::Completed,
            ..draft("Plan v2", day(2024, 6, 2), day(2024, 6, 4))
        };
        planner.update(id, edit).unwrap();
        let task = planner.get(id).unwrap();
        assert_eq!(task.name, "Plan v2");
        assert_eq!(task.category, Category::Completed);
        assert_eq!(task.day_count(), 3);
    }

    #[test]
    fn missing_targets_are_no_ops() {
        let mut planner = planner_with(vec![]);
        let ghost = Uuid::new_v4();
        assert!(!planner.move_by(ghost, 3));
        assert!(!planner.resize(ghost, day(2024, 6, 1), day(2024, 6, 2)));
        assert!(!planner.delete(ghost));
    }

    #[test]
    fn out_of_range_move_leaves_task_alone() {
        let task = Task::new("Plan", Category::ToDo, day(2024, 6, 1), day(2024, 6, 3));
        let id = task.id;
        let mut planner = planner_with(vec![task.clone()]);
        assert!(!planner.move_by(id, 400_000_000));
        assert!(!planner.move_by(id, i64::MIN));
        assert_eq!(planner.get(id), Some(&task));
    }

    #[test]
    fn delete_and_clear_all() {
        let a = Task::new("a", Category::ToDo, day(2024, 6, 1), day(2024, 6, 1));
        let b = Task::new("b", Category::ToDo, day(2024, 6, 2), day(2024, 6, 2));
        let mut planner = planner_with(vec![a.clone(), b]);
        assert!(planner.delete(a.id));
        assert_eq!(planner.tasks().len(), 1);
        planner.clear_all();
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn drag_select_then_submit_creates_task() {
        let mut planner = planner_with(vec![]);
        planner.pointer_down(PointerTarget::Cell(day(2024, 6, 14)), 0.0);
        planner.pointer_enter(day(2024, 6, 12));
        let outcome = planner.pointer_up(Some(day(2024, 6, 12)));
        assert_eq!(
            outcome,
            GestureOutcome::OpenCreateForm { start: day(2024, 6, 12), end: day(2024, 6, 14) }
        );

        assert_eq!(planner.submit_selection("", Category::Review), Err(PlannerError::EmptyName));
        assert!(planner.tasks().is_empty());

        planner.submit_selection("Write docs", Category::Review).unwrap();
        let task = &planner.tasks()[0];
        assert_eq!((task.start, task.end), (day(2024, 6, 12), day(2024, 6, 14)));
        assert_eq!(task.category, Category::Review);
    }

    #[test]
    fn drag_move_preserves_duration() {
        let task = Task::new("Ship", Category::ToDo, day(2024, 6, 1), day(2024, 6, 1));
        let id = task.id;
        let mut planner = planner_with(vec![task]);
        planner.pointer_down(PointerTarget::TaskBar(id, day(2024, 6, 1)), 0.0);
        planner.pointer_enter(day(2024, 6, 6));
        assert_eq!(planner.pointer_up(Some(day(2024, 6, 6))), GestureOutcome::None);
        let moved = planner.get(id).unwrap();
        assert_eq!((moved.start, moved.end), (day(2024, 6, 6), day(2024, 6, 6)));
    }

    #[test]
    fn live_resize_clamps_left_edge_to_end() {
        let task = Task::new("Fix", Category::ToDo, day(2024, 6, 5), day(2024, 6, 8));
        let id = task.id;
        let mut planner = planner_with(vec![task]);
        planner.set_pixels_per_day(10.0);
        planner.pointer_down(PointerTarget::ResizeHandle(id, Edge::Start), 0.0);
        assert!(planner.pointer_move(50.0));
        let task = planner.get(id).unwrap();
        assert_eq!((task.start, task.end), (day(2024, 6, 8), day(2024, 6, 8)));
        planner.pointer_up(None);
        assert!(planner.gestures().is_idle());
    }

    #[test]
    fn cancelled_resize_leaves_task_unchanged() {
        let task = Task::new("Fix", Category::ToDo, day(2024, 6, 5), day(2024, 6, 8));
        let id = task.id;
        let mut planner = planner_with(vec![task.clone()]);
        planner.set_pixels_per_day(10.0);
        planner.pointer_down(PointerTarget::ResizeHandle(id, Edge::End), 0.0);
        assert!(planner.pointer_move(30.0));
        planner.cancel_gesture();
        assert_eq!(planner.get(id), Some(&task));
    }

    #[test]
    fn layout_uses_filters_and_anchor() {
        let a = Task::new("Design", Category::ToDo, day(2024, 6, 3), day(2024, 6, 4));
        let b = Task::new("Build", Category::Review, day(2024, 6, 3), day(2024, 6, 4));
        let mut planner = planner_with(vec![a, b]);
        let today = day(2024, 6, 1);

        let weeks = planner.layout(today);
        assert_eq!(weeks[1].lanes, 2);

        planner.filters.search = "build".into();
        let weeks = planner.layout(today);
        assert_eq!(weeks[1].lanes, 1);
        assert_eq!(planner.visible_tasks(today).len(), 1);

        planner.next_month();
        assert_eq!(planner.grid().month_start(), day(2024, 7, 1));
        assert!(planner.layout(today).iter().all(|w| w.segments.is_empty()));
        planner.previous_month();
        planner.previous_month();
        assert_eq!(planner.grid().month_start(), day(2024, 5, 1));
    }

    proptest! {
        #[test]
        fn ranges_stay_ordered_under_random_edits(
            ops in proptest::collection::vec((0u8..3, -20i64..20, any::<bool>()), 1..40)
        ) {
            let task = Task::new("p", Category::ToDo, day(2024, 6, 10), day(2024, 6, 14));
            let id = task.id;
            let mut planner = planner_with(vec![task]);
            planner.set_pixels_per_day(10.0);

            for (kind, amount, left) in ops {
                let before = planner.get(id).unwrap().clone();
                match kind {
                    0 => {
                        planner.move_by(id, amount);
                        let after = planner.get(id).unwrap();
                        prop_assert_eq!(after.end - after.start, before.end - before.start);
                        prop_assert_eq!(after.start, before.start + Duration::days(amount));
                    }
                    1 => {
                        let edge = if left { Edge::Start } else { Edge::End };
                        planner.pointer_down(PointerTarget::ResizeHandle(id, edge), 0.0);
                        planner.pointer_move(amount as f32 * 10.0);
                        planner.pointer_up(None);
                    }
                    _ => {
                        planner.pointer_down(PointerTarget::Cell(before.end), 0.0);
                        planner.pointer_enter(before.start - Duration::days(amount.abs()));
                        planner.pointer_up(None);
                        planner.submit_selection("new", Category::ToDo).unwrap();
                    }
                }
                for t in planner.tasks() {
                    prop_assert!(t.start <= t.end);
                }
            }
        }
    }
}
