//! Status reporting
//!
//! Pushes task status changes to the control plane. Reporting is
//! best-effort: each report is retried with exponential backoff and then
//! dropped, callers never see an error.

use async_trait::async_trait;
use deploybot_core::domain::task::TaskStatus;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::repository::TaskRepository;

/// Service trait for reporting task status
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Reports `status` for a task, swallowing delivery failures
    async fn report(&self, pipeline_id: &str, task_id: &str, status: TaskStatus);
}

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, 1 disables retry
    pub attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Reporter writing through the control plane task repository
pub struct ControlPlaneReporter {
    tasks: Arc<dyn TaskRepository>,
    retry: RetryPolicy,
}

impl ControlPlaneReporter {
    /// Creates a new reporter
    ///
    /// # Arguments
    /// * `tasks` - Repository used to post status updates
    /// * `retry` - Backoff applied to failed posts
    pub fn new(tasks: Arc<dyn TaskRepository>, retry: RetryPolicy) -> Self {
        Self { tasks, retry }
    }
}

#[async_trait]
impl StatusReporter for ControlPlaneReporter {
    async fn report(&self, pipeline_id: &str, task_id: &str, status: TaskStatus) {
        let mut attempt = 0;
        let mut delay = self.retry.initial_delay;

        loop {
            attempt += 1;

            match self
                .tasks
                .update_task_status(pipeline_id, task_id, status)
                .await
            {
                Ok(()) => {
                    if attempt > 1 {
                        info!(
                            "Reported {} for task {} after {} attempt(s)",
                            status, task_id, attempt
                        );
                    } else {
                        debug!("Reported {} for task {}", status, task_id);
                    }
                    return;
                }
                Err(e) => {
                    if attempt >= self.retry.attempts {
                        error!(
                            "Dropping {} report for task {} of pipeline {} after {} attempt(s): {}",
                            status, task_id, pipeline_id, attempt, e
                        );
                        return;
                    }

                    warn!(
                        "Failed to report {} for task {} (attempt {}/{}): {}",
                        status, task_id, attempt, self.retry.attempts, e
                    );

                    tokio::time::sleep(delay).await;

                    // Exponential backoff with cap
                    delay = (delay * 2).min(self.retry.max_delay);
                }
            }
        }
    }
}
