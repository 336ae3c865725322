//! Task dispatch contract and the in-process queue.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::observability::MetricsRegistry;

use super::errors::{TaskError, TaskResult};
use super::task::Task;

/// Accepts work for asynchronous, at-least-once execution
pub trait TaskDispatcher: Send + Sync {
    fn dispatch(&self, task: Task) -> TaskResult<()>;
}

/// Dispatcher backed by an unbounded tokio channel
#[derive(Clone)]
pub struct QueueDispatcher {
    sender: UnboundedSender<Task>,
    metrics: Arc<MetricsRegistry>,
}

impl QueueDispatcher {
    /// Creates a dispatcher and the receiving end a worker drains
    pub fn channel(metrics: Arc<MetricsRegistry>) -> (Self, UnboundedReceiver<Task>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, metrics }, receiver)
    }
}

impl TaskDispatcher for QueueDispatcher {
    fn dispatch(&self, task: Task) -> TaskResult<()> {
        debug!(task = %task.name, "task dispatched");
        self.sender.send(task).map_err(|_| TaskError::QueueClosed)?;
        self.metrics.increment_tasks_dispatched();
        Ok(())
    }
}
