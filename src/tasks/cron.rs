//! # Cron Schedules
//!
//! Each schedule dispatches one named task whenever its expression fires.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::dispatcher::TaskDispatcher;
use super::errors::{TaskError, TaskResult};
use super::task::Task;

/// A task fired on a cron expression
pub struct CronSchedule {
    /// Task dispatched on every fire
    pub task_name: String,
    /// Five-field cron expression
    pub expression: String,
    cron: Cron,
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronSchedule")
            .field("task_name", &self.task_name)
            .field("expression", &self.expression)
            .finish()
    }
}

impl CronSchedule {
    /// Parses the expression; an invalid one is rejected up front
    pub fn new(task_name: impl Into<String>, expression: impl Into<String>) -> TaskResult<Self> {
        let expression = expression.into();
        let cron = Cron::new(&expression)
            .parse()
            .map_err(|e| TaskError::InvalidCron(format!("{}: {}", expression, e)))?;

        Ok(Self {
            task_name: task_name.into(),
            expression,
            cron,
        })
    }

    /// First fire time strictly after `after`
    pub fn next_after(&self, after: &DateTime<Utc>) -> TaskResult<DateTime<Utc>> {
        self.cron
            .find_next_occurrence(after, false)
            .map_err(|e| TaskError::InvalidCron(format!("{}: {}", self.expression, e)))
    }

    /// Spawns a loop that sleeps until each fire time and dispatches the task
    pub fn spawn(self, dispatcher: Arc<dyn TaskDispatcher>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = match self.next_after(&now) {
                    Ok(next) => next,
                    Err(e) => {
                        warn!(task = %self.task_name, error = %e, "cron schedule stopped");
                        return;
                    }
                };

                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                info!(task = %self.task_name, cron = %self.expression, "cron fired");
                if let Err(e) = dispatcher.dispatch(Task::new(self.task_name.clone())) {
                    warn!(task = %self.task_name, error = %e, "cron dispatch failed");
                    return;
                }
            }
        })
    }
}
