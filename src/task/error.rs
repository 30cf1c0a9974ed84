use chrono::NaiveDate;
use thiserror::Error;

/// A well-formed task request whose fields break a constraint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Task title is {actual} characters long, the limit is {max}")]
    TitleTooLong { max: usize, actual: usize },

    #[error("Due date {0} is already in the past")]
    DueDateInPast(NaiveDate),

    #[error("Estimated hours must be positive, got {0}")]
    InvalidHours(f64),
}
