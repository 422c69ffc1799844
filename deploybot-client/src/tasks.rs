//! Task-related API endpoints

use crate::ControlPlaneClient;
use crate::error::Result;
use deploybot_core::domain::task::{Task, TaskStatus};
use deploybot_core::dto::task::{GetTaskResponse, UpdateTaskStatusInput};
use tracing::debug;

impl ControlPlaneClient {
    // =============================================================================
    // Task Lifecycle
    // =============================================================================

    /// Fetch a task definition
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline owning the task
    /// * `task_id` - The task to fetch
    ///
    /// # Returns
    /// The full task record
    pub async fn get_task(&self, pipeline_id: &str, task_id: &str) -> Result<Task> {
        let url = format!("{}/task", self.base_url);
        debug!("Fetching task {} of pipeline {}", task_id, pipeline_id);

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("pid", pipeline_id), ("id", task_id)])
            .send()
            .await?;

        let body: GetTaskResponse = self.handle_response(response).await?;
        Ok(body.payload.task)
    }

    /// Update the status of a task
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline owning the task
    /// * `task_id` - The task to update
    /// * `status` - The new status
    pub async fn update_task_status(
        &self,
        pipeline_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<()> {
        let url = format!("{}/taskStatus", self.base_url);
        let response = self
            .authorize(self.client.put(&url))
            .json(&UpdateTaskStatusInput::new(pipeline_id, task_id, status))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
