//! Tasks repository
//!
//! Handles communication with the control plane for task operations:
//! - Fetching a task definition
//! - Updating task status

use async_trait::async_trait;
use deploybot_client::{ClientError, ControlPlaneClient};
use deploybot_core::domain::task::{Task, TaskStatus};

/// Repository trait for task operations with the control plane
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetches a task definition
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline owning the task
    /// * `task_id` - The task to fetch
    async fn fetch_task(&self, pipeline_id: &str, task_id: &str) -> Result<Task, ClientError>;

    /// Updates the task status
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline owning the task
    /// * `task_id` - The task to update
    /// * `status` - The new status
    async fn update_task_status(
        &self,
        pipeline_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), ClientError>;
}

/// HTTP implementation of TaskRepository
pub struct HttpTaskRepository {
    client: ControlPlaneClient,
}

impl HttpTaskRepository {
    /// Creates a new HTTP task repository
    ///
    /// # Arguments
    /// * `client` - Control plane client, already carrying the API key
    pub fn new(client: ControlPlaneClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskRepository for HttpTaskRepository {
    async fn fetch_task(&self, pipeline_id: &str, task_id: &str) -> Result<Task, ClientError> {
        self.client.get_task(pipeline_id, task_id).await
    }

    async fn update_task_status(
        &self,
        pipeline_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), ClientError> {
        self.client
            .update_task_status(pipeline_id, task_id, status)
            .await
    }
}
