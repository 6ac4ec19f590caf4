use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::task::TaskStatus;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub command: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl SubmitResponse {
    /// The task id, if the backend sent a usable one.
    pub fn into_task_id(self) -> Result<String, BackendError> {
        match self.task_id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(BackendError::MissingTaskId),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}

/// The two endpoints of a task-oriented backend.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Hands a command to the backend and returns the id it was queued under.
    async fn submit(&self, command: &str) -> Result<String, BackendError>;

    async fn status(&self, task_id: &str) -> Result<StatusReport, BackendError>;
}
