use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use super::task::{Category, Task};

/// How far ahead of today a task may start and still be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Horizon {
    #[default]
    All,
    Weeks1,
    Weeks2,
    Weeks3,
}

impl Horizon {
    pub fn all() -> &'static [Horizon] {
        &[Horizon::All, Horizon::Weeks1, Horizon::Weeks2, Horizon::Weeks3]
    }

    /// Number of weeks, 0 meaning no limit.
    pub fn weeks(self) -> i64 {
        match self {
            Horizon::All => 0,
            Horizon::Weeks1 => 1,
            Horizon::Weeks2 => 2,
            Horizon::Weeks3 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Horizon::All => "All",
            Horizon::Weeks1 => "Within 1 week",
            Horizon::Weeks2 => "Within 2 weeks",
            Horizon::Weeks3 => "Within 3 weeks",
        }
    }
}

/// Active filter state for the visible task set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filters {
    pub categories: BTreeSet<Category>,
    pub horizon: Horizon,
    pub search: String,
}

impl Filters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.categories.is_empty() || self.horizon != Horizon::All || !self.search.is_empty()
    }

    /// Whether `task` passes every active clause, relative to `today`.
    pub fn accepts(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.search.is_empty()
            && !task.name.to_lowercase().contains(&self.search.to_lowercase())
        {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.contains(&task.category) {
            return false;
        }

        let weeks = self.horizon.weeks();
        if weeks > 0 && task.start > today + Duration::days(weeks * 7) {
            return false;
        }

        true
    }

    pub fn apply<'a>(
        &'a self,
        tasks: &'a [Task],
        today: NaiveDate,
    ) -> impl Iterator<Item = &'a Task> + 'a {
        tasks.iter().filter(move |t| self.accepts(t, today))
    }
}
