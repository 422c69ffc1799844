//! Task orchestrator
//!
//! Drives one task through `Received -> InProgress -> {Done | Failed | TimedOut}`.
//! The timeout timer and the execution run as independent tokio tasks and
//! race for a per-task [`TerminalGate`]; whichever claims it first reports.
//! Neither may claim the gate before the `InProgress` report has settled.

use deploybot_core::domain::task::{Task, TaskStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::gate::TerminalGate;
use super::timer::OutstandingTimer;
use crate::service::{ExecutionService, StatusReporter};

/// Runs accepted tasks and reports their status
pub struct TaskOrchestrator {
    executor: Arc<dyn ExecutionService>,
    reporter: Arc<dyn StatusReporter>,
}

impl TaskOrchestrator {
    /// Creates a new orchestrator
    pub fn new(executor: Arc<dyn ExecutionService>, reporter: Arc<dyn StatusReporter>) -> Self {
        Self { executor, reporter }
    }

    /// Starts a task
    ///
    /// Arms the timeout timer, reports `InProgress` and launches execution.
    /// Returns once execution is running; the handle resolves to the status
    /// the execution reported, or `None` when the timer had already claimed
    /// the terminal status.
    ///
    /// # Arguments
    /// * `pipeline_id` - Pipeline named by the webhook
    /// * `task` - The task fetched from the control plane
    /// * `arguments` - Arguments carried by the webhook
    pub async fn dispatch(
        &self,
        pipeline_id: &str,
        task: Task,
        arguments: Vec<String>,
    ) -> JoinHandle<Option<TaskStatus>> {
        let pipeline_id = pipeline_id.to_string();
        let gate = Arc::new(TerminalGate::new());
        let (started, started_rx) = watch::channel(false);

        let timer = if task.has_timeout() {
            let delay = Duration::from_secs(task.timeout.saturating_mul(60));
            debug!("Arming {:?} timeout for task {}", delay, task.id);
            Some(self.arm_timeout(delay, &pipeline_id, &task.id, Arc::clone(&gate), started_rx))
        } else {
            None
        };

        self.reporter
            .report(&pipeline_id, &task.id, TaskStatus::InProgress)
            .await;
        started.send_replace(true);

        let executor = Arc::clone(&self.executor);
        let reporter = Arc::clone(&self.reporter);

        tokio::spawn(async move {
            let result = executor.execute(&task, &arguments).await;

            if let Some(timer) = timer {
                if timer.has_fired() {
                    debug!("Timeout of task {} already fired", task.id);
                }
                timer.cancel();
            }

            let status = match &result {
                Ok(()) => TaskStatus::Done,
                Err(_) => TaskStatus::Failed,
            };

            if !gate.claim(status) {
                debug!(
                    "Task {} finished as {} after terminal status {:?}, not reporting",
                    task.id,
                    status,
                    gate.winner()
                );
                return None;
            }

            info!("Task {} of pipeline {} finished: {}", task.id, pipeline_id, status);
            reporter.report(&pipeline_id, &task.id, status).await;
            Some(status)
        })
    }

    /// Arms the timer reporting `TimedOut`
    ///
    /// The action holds back until `started` turns true, so a slow
    /// `InProgress` post is never overtaken by the timeout report.
    fn arm_timeout(
        &self,
        delay: Duration,
        pipeline_id: &str,
        task_id: &str,
        gate: Arc<TerminalGate>,
        mut started: watch::Receiver<bool>,
    ) -> OutstandingTimer {
        let reporter = Arc::clone(&self.reporter);
        let pipeline_id = pipeline_id.to_string();
        let task_id = task_id.to_string();

        OutstandingTimer::arm(delay, move || async move {
            if started.wait_for(|started| *started).await.is_err() {
                debug!("Task {} was dropped before it started", task_id);
                return;
            }

            if !gate.claim(TaskStatus::TimedOut) {
                debug!(
                    "Timeout of task {} fired after terminal status {:?}",
                    task_id,
                    gate.winner()
                );
                return;
            }

            warn!("Task {} of pipeline {} timed out after {:?}", task_id, pipeline_id, delay);
            reporter
                .report(&pipeline_id, &task_id, TaskStatus::TimedOut)
                .await;
        })
    }
}
