use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Category, Task};

/// Snapshot format written to the store. Bump when fields change shape.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// The task collection and the persisted snapshot shape `{ version, tasks }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBook {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for TaskBook {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tasks: Vec::new(),
        }
    }
}

impl TaskBook {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tasks,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Drop tasks that violate the model (blank names, duplicate ids) and
    /// repair inverted ranges. Returns how many tasks were dropped.
    pub fn sanitize(&mut self) -> usize {
        let before = self.tasks.len();
        let mut seen = std::collections::HashSet::new();
        self.tasks
            .retain(|t| !t.name.trim().is_empty() && seen.insert(t.id));
        for task in &mut self.tasks {
            if task.start > task.end {
                std::mem::swap(&mut task.start, &mut task.end);
            }
        }
        before - self.tasks.len()
    }

    /// A few tasks around `today` to populate an empty planner.
    pub fn sample(today: NaiveDate) -> Self {
        let d = |offset: i64| today + chrono::Duration::days(offset);
        Self::new(vec![
            Task::new("Project kickoff", Category::Completed, d(-3), d(-2)),
            Task::new("Requirements gathering", Category::InProgress, d(-1), d(4)),
            Task::new("UI design", Category::ToDo, d(2), d(9)),
            Task::new("Backend API", Category::ToDo, d(5), d(16)),
            Task::new("Design review", Category::Review, d(10), d(10)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unversioned_snapshot_defaults_to_current_version() {
        let book: TaskBook = serde_json::from_str(r#"{ "tasks": [] }"#).unwrap();
        assert_eq!(book, TaskBook::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r##"{
            "version": 1,
            "theme": "dark",
            "tasks": [{
                "id": "6f1c2a44-5d6e-4f70-8a9b-0c1d2e3f4a5b",
                "name": "Design",
                "category": "To Do",
                "start": "2024-06-01",
                "end": "2024-06-03",
                "color": "#ff0000"
            }]
        }"##;
        let book: TaskBook = serde_json::from_str(raw).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.tasks[0].end, day(2024, 6, 3));
    }

    #[test]
    fn sanitize_drops_blank_and_duplicate_tasks() {
        let keep = Task::new("Keep", Category::ToDo, day(2024, 6, 1), day(2024, 6, 2));
        let mut inverted = Task::new("Inverted", Category::ToDo, day(2024, 6, 1), day(2024, 6, 2));
        std::mem::swap(&mut inverted.start, &mut inverted.end);
        let blank = Task::new("  ", Category::ToDo, day(2024, 6, 1), day(2024, 6, 1));
        let mut book = TaskBook::new(vec![keep.clone(), keep.clone(), blank, inverted]);

        assert_eq!(book.sanitize(), 2);
        assert_eq!(book.len(), 2);
        let fixed = &book.tasks[1];
        assert_eq!((fixed.start, fixed.end), (day(2024, 6, 1), day(2024, 6, 2)));
    }

    #[test]
    fn sample_tasks_have_valid_ranges() {
        let book = TaskBook::sample(day(2024, 6, 15));
        assert_eq!(book.len(), 5);
        assert!(book.tasks.iter().all(|t| t.start <= t.end));
    }
}
