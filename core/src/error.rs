use thiserror::Error;

/// Rejections raised before any task state is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("Interval must be at least 1 (got {0})")]
    InvalidInterval(i64),

    #[error("Unknown interval unit: '{0}'")]
    UnknownUnit(String),

    #[error("Unknown color: '{0}'")]
    UnknownColor(String),

    #[error("Invalid interval: '{0}'")]
    MalformedInterval(String),

    #[error("Unknown option: '{0}'")]
    UnknownOption(String),

    #[error("Ambiguous option: '{0}' matches {1}")]
    AmbiguousOption(String, String),
}
