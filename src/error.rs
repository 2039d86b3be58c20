use chrono::NaiveDate;
use uuid::Uuid;

/// Rejections surfaced to the task form. None of them mutate the task book.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("please enter a task name")]
    EmptyName,
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("task {0} no longer exists")]
    TaskNotFound(Uuid),
}
