//! Task worker: drains the queue and redelivers failures.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::observability::MetricsRegistry;

use super::errors::TaskResult;
use super::task::Task;

/// Executes tasks by name
pub trait TaskHandler: Send + Sync {
    fn handle(&self, task: &Task) -> TaskResult<()>;
}

/// Pulls tasks off the queue and hands them to the handler.
///
/// A retryable failure is redelivered until `max_attempts` deliveries have
/// been made; after that the task is dropped with a warning.
pub struct TaskWorker {
    queue: UnboundedReceiver<Task>,
    handler: Arc<dyn TaskHandler>,
    max_attempts: u32,
    metrics: Arc<MetricsRegistry>,
    redeliveries: VecDeque<Task>,
}

impl TaskWorker {
    pub fn new(
        queue: UnboundedReceiver<Task>,
        handler: Arc<dyn TaskHandler>,
        max_attempts: u32,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            queue,
            handler,
            max_attempts: max_attempts.max(1),
            metrics,
            redeliveries: VecDeque::new(),
        }
    }

    /// Runs until every dispatcher is dropped
    pub async fn run(mut self) {
        info!(max_attempts = self.max_attempts, "task worker started");
        while let Some(task) = self.queue.recv().await {
            self.process(task);
            self.drain_redeliveries();
        }
        info!("task worker stopped");
    }

    /// Handles everything currently queued; returns the number of tasks taken
    /// off the queue
    pub fn run_pending(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(task) = self.queue.try_recv() {
            self.process(task);
            taken += 1;
        }
        self.drain_redeliveries();
        taken
    }

    fn drain_redeliveries(&mut self) {
        while let Some(task) = self.redeliveries.pop_front() {
            self.process(task);
        }
    }

    fn process(&mut self, mut task: Task) {
        task.attempt += 1;

        match self.handler.handle(&task) {
            Ok(()) => {
                self.metrics.increment_tasks_completed();
            }
            Err(e) => {
                self.metrics.increment_tasks_failed();
                if e.is_retryable() && task.attempt < self.max_attempts {
                    warn!(task = %task.name, attempt = task.attempt, error = %e, "task failed, redelivering");
                    self.redeliveries.push_back(task);
                } else {
                    warn!(task = %task.name, attempt = task.attempt, error = %e, "task dropped");
                }
            }
        }
    }
}
