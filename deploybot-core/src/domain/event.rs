//! Event domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification that a task was requested through the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub pipeline_id: String,
    pub task_id: String,
    pub arguments: Vec<String>,
    pub received_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time
    pub fn new(
        pipeline_id: impl Into<String>,
        task_id: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pipeline_id: pipeline_id.into(),
            task_id: task_id.into(),
            arguments,
            received_at: Utc::now(),
        }
    }
}
