//! Fake task repository for testing

use super::TaskRepository;
use async_trait::async_trait;
use deploybot_client::ClientError;
use deploybot_core::domain::task::{Task, TaskStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory control plane
#[derive(Clone, Default)]
pub struct FakeTaskRepository {
    tasks: Arc<Mutex<HashMap<(String, String), Task>>>,
    updates: Arc<Mutex<Vec<(String, String, TaskStatus)>>>,
    fetch_error: Arc<Mutex<Option<(u16, String)>>>,
    parse_error: Arc<Mutex<bool>>,
    failing_updates: Arc<Mutex<u32>>,
    update_latency: Arc<Mutex<Duration>>,
}

impl FakeTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a task under its own pipeline and task ids
    pub fn insert(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((task.pipeline_id.clone(), task.id.clone()), task);
    }

    /// Makes fetches answer with a non-success status
    pub fn fail_fetch_with(&self, status: u16, message: &str) {
        *self.fetch_error.lock().unwrap_or_else(|e| e.into_inner()) =
            Some((status, message.to_string()));
    }

    /// Makes fetches return an undecodable body
    pub fn fail_fetch_decode(&self) {
        *self.parse_error.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    /// Makes the next `count` status updates fail
    pub fn fail_updates(&self, count: u32) {
        *self.failing_updates.lock().unwrap_or_else(|e| e.into_inner()) = count;
    }

    /// Makes every status update take `latency` before it answers
    pub fn delay_updates(&self, latency: Duration) {
        *self.update_latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Status updates accepted so far, in order
    pub fn updates(&self) -> Vec<(String, String, TaskStatus)> {
        self.updates.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Accepted statuses of one task, in order
    pub fn statuses(&self, pipeline_id: &str, task_id: &str) -> Vec<TaskStatus> {
        self.updates()
            .into_iter()
            .filter(|(p, t, _)| p == pipeline_id && t == task_id)
            .map(|(_, _, status)| status)
            .collect()
    }
}

#[async_trait]
impl TaskRepository for FakeTaskRepository {
    async fn fetch_task(&self, pipeline_id: &str, task_id: &str) -> Result<Task, ClientError> {
        if let Some((status, message)) = self
            .fetch_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(ClientError::api_error(status, message));
        }

        if *self.parse_error.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(ClientError::ParseError(
                "unknown variant `test`, expected `build` or `deploy`".to_string(),
            ));
        }

        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(pipeline_id.to_string(), task_id.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::api_error(404, "task not found"))
    }

    async fn update_task_status(
        &self,
        pipeline_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), ClientError> {
        let latency = *self.update_latency.lock().unwrap_or_else(|e| e.into_inner());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        {
            let mut failing = self
                .failing_updates
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if *failing > 0 {
                *failing -= 1;
                return Err(ClientError::api_error(503, "control plane unavailable"));
            }
        }

        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((pipeline_id.to_string(), task_id.to_string(), status));
        Ok(())
    }
}
