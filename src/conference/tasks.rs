//! Task handler for conference work items.

use std::sync::Arc;

use tracing::info;

use crate::store::EntityKey;
use crate::tasks::{
    Task, TaskError, TaskHandler, TaskResult, REFRESH_FEATURED_SPEAKER_CACHE,
    SEND_CONFERENCE_CONFIRMATION_EMAIL, SEND_SESSION_CONFIRMATION_EMAIL, SET_ANNOUNCEMENT,
    SET_FEATURED_SPEAKER,
};

use super::errors::ServiceError;
use super::service::{parse_speakers, ConferenceService};

/// Routes dispatched tasks to the conference service
pub struct ConferenceTaskHandler {
    service: Arc<ConferenceService>,
}

impl ConferenceTaskHandler {
    pub fn new(service: Arc<ConferenceService>) -> Self {
        Self { service }
    }

    fn set_featured_speaker(&self, task: &Task) -> TaskResult<()> {
        let bad_params = |reason: &str| TaskError::BadParams {
            task: task.name.clone(),
            reason: reason.to_string(),
        };

        let conference = EntityKey::from_websafe(task.param("conference")?)
            .map_err(|_| bad_params("invalid conference key"))?;
        let speakers = parse_speakers(task.param("speakers")?)
            .ok_or_else(|| bad_params("speakers must be a JSON array of strings"))?;

        self.service
            .record_session_speakers(&conference, &speakers)
            .map_err(|e| failed(task, e))
    }

    fn send_confirmation_email(&self, task: &Task) -> TaskResult<()> {
        let email = task.param("email")?;
        let subject_info = task.param("info")?;
        info!(task = %task.name, email, info = subject_info, "confirmation email sent");
        Ok(())
    }
}

fn failed(task: &Task, err: ServiceError) -> TaskError {
    TaskError::HandlerFailed {
        task: task.name.clone(),
        reason: err.to_string(),
    }
}

impl TaskHandler for ConferenceTaskHandler {
    fn handle(&self, task: &Task) -> TaskResult<()> {
        match task.name.as_str() {
            SET_FEATURED_SPEAKER => self.set_featured_speaker(task),
            SEND_CONFERENCE_CONFIRMATION_EMAIL | SEND_SESSION_CONFIRMATION_EMAIL => {
                self.send_confirmation_email(task)
            }
            SET_ANNOUNCEMENT => self
                .service
                .refresh_announcement()
                .map(|_| ())
                .map_err(|e| failed(task, e)),
            REFRESH_FEATURED_SPEAKER_CACHE => self
                .service
                .refresh_featured_speakers()
                .map(|_| ())
                .map_err(|e| failed(task, e)),
            other => Err(TaskError::UnknownTask(other.to_string())),
        }
    }
}
