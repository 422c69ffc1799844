//! Task DTOs for control-plane communication

use serde::{Deserialize, Serialize};

use crate::domain::task::{Task, TaskStatus};

/// Response of the control plane's task fetch endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTaskResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    pub payload: GetTaskPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTaskPayload {
    pub task: Task,
}

/// Status update sent to the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusInput {
    pub pipeline_id: String,
    pub task_id: String,
    pub task: TaskStatusUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

impl UpdateTaskStatusInput {
    pub fn new(pipeline_id: &str, task_id: &str, status: TaskStatus) -> Self {
        Self {
            pipeline_id: pipeline_id.to_string(),
            task_id: task_id.to_string(),
            task: TaskStatusUpdate { status },
        }
    }
}
