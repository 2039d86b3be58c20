use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow column a task belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Completed,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::ToDo,
            Category::InProgress,
            Category::Review,
            Category::Completed,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::ToDo => "To Do",
            Category::InProgress => "In Progress",
            Category::Review => "Review",
            Category::Completed => "Completed",
        }
    }
}

/// A single multi-day task on the calendar. `start` and `end` are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    #[serde(with = "iso_day")]
    pub start: NaiveDate,
    #[serde(with = "iso_day")]
    pub end: NaiveDate,
}

impl Task {
    /// Create a new task. The range is normalised so that `start <= end`.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Inclusive number of calendar days covered.
    pub fn day_count(&self) -> i64 {
        inclusive_day_count(self.start, self.end)
    }

    /// Shift both ends by `days`, keeping the duration. Leaves the task
    /// untouched and returns `false` when either end leaves chrono's range.
    pub fn shift(&mut self, days: i64) -> bool {
        match (offset_day(self.start, days), offset_day(self.end, days)) {
            (Some(start), Some(end)) => {
                self.start = start;
                self.end = end;
                true
            }
            _ => false,
        }
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// `day` moved by `days`, or `None` past the representable calendar.
pub fn offset_day(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|step| day.checked_add_signed(step))
}

/// Inclusive day count between two dates, never less than one.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

/// Canonical `YYYY-MM-DD` key for a calendar day.
pub fn iso_key(day: NaiveDate) -> String {
    day.format(iso_day::FORMAT).to_string()
}

/// Serde helper for `NaiveDate` stored as a `YYYY-MM-DD` string.
pub mod iso_day {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.trim();
        // Tolerate full ISO timestamps by keeping only the date part.
        let day = trimmed.get(..10).unwrap_or(trimmed);
        NaiveDate::parse_from_str(day, FORMAT).map_err(serde::de::Error::custom)
    }
}
