//! # Task

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{TaskError, TaskResult};

pub const SET_FEATURED_SPEAKER: &str = "set_featured_speaker";
pub const SEND_CONFERENCE_CONFIRMATION_EMAIL: &str = "send_conference_confirmation_email";
pub const SEND_SESSION_CONFIRMATION_EMAIL: &str = "send_session_confirmation_email";
pub const SET_ANNOUNCEMENT: &str = "set_announcement";
pub const REFRESH_FEATURED_SPEAKER_CACHE: &str = "refresh_featured_speaker_cache";

/// A named work item with string parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub params: BTreeMap<String, String>,
    /// Deliveries so far
    pub attempt: u32,
}

impl Task {
    /// Create a task with no parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
            attempt: 0,
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Required parameter
    pub fn param(&self, key: &str) -> TaskResult<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| TaskError::BadParams {
                task: self.name.clone(),
                reason: format!("missing '{}'", key),
            })
    }
}
