//! # Task Errors

use thiserror::Error;

/// Result type for task operations
pub type TaskResult<T> = Result<T, TaskError>;

/// Task dispatch and handling errors
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    #[error("Task queue closed")]
    QueueClosed,

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Bad parameters for task {task}: {reason}")]
    BadParams { task: String, reason: String },

    #[error("Task {task} failed: {reason}")]
    HandlerFailed { task: String, reason: String },

    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),
}

impl TaskError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::QueueClosed => 503,
            TaskError::UnknownTask(_) => 400,
            TaskError::BadParams { .. } => 400,
            TaskError::HandlerFailed { .. } => 500,
            TaskError::InvalidCron(_) => 400,
        }
    }

    /// Only handler failures are worth another delivery
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::HandlerFailed { .. })
    }
}
