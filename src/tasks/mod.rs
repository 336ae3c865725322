//! # Tasks
//!
//! Out-of-request work: named tasks go through a `TaskDispatcher`, a
//! `TaskWorker` drains them with at-least-once redelivery, and
//! `CronSchedule`s dispatch the periodic refreshes.

mod cron;
mod dispatcher;
mod errors;
mod task;
mod worker;

pub use cron::CronSchedule;
pub use dispatcher::{QueueDispatcher, TaskDispatcher};
pub use errors::{TaskError, TaskResult};
pub use task::{
    Task, REFRESH_FEATURED_SPEAKER_CACHE, SEND_CONFERENCE_CONFIRMATION_EMAIL,
    SEND_SESSION_CONFIRMATION_EMAIL, SET_ANNOUNCEMENT, SET_FEATURED_SPEAKER,
};
pub use worker::{TaskHandler, TaskWorker};
