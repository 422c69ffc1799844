//! Task domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Branch cloned when a build task does not name one
pub const DEFAULT_BRANCH: &str = "main";

/// Restart policy applied when a deploy task does not name one
pub const DEFAULT_RESTART_POLICY: &str = "on-failure";

/// Tag used when an image reference carries none
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Unit of work fetched from the control plane
///
/// The configuration payload is kept as received and only decoded into a
/// [`TaskConfig`] when the task is executed, so a malformed payload fails the
/// task instead of the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub pipeline_id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub config: serde_json::Value,
    /// Timeout in minutes, zero disables it
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Task {
    /// Decodes the configuration payload according to the declared kind
    pub fn decode_config(&self) -> Result<TaskConfig, serde_json::Error> {
        match self.kind {
            TaskKind::Build => BuildConfig::deserialize(&self.config).map(TaskConfig::Build),
            TaskKind::Deploy => DeployConfig::deserialize(&self.config).map(TaskConfig::Deploy),
        }
    }

    /// Whether a timeout timer must be armed for this task
    pub fn has_timeout(&self) -> bool {
        self.timeout > 0
    }
}

/// Kind of work a task describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Build,
    Deploy,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Build => write!(f, "build"),
            TaskKind::Deploy => write!(f, "deploy"),
        }
    }
}

/// Task status as tracked by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Failed,
    TimedOut,
}

impl TaskStatus {
    /// Terminal statuses are absorbing: at most one is reported per execution
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Done | TaskStatus::Failed | TaskStatus::TimedOut
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Failed => "FAILED",
            TaskStatus::TimedOut => "TIMED_OUT",
        };
        write!(f, "{}", s)
    }
}

/// Typed task configuration
#[derive(Debug, Clone)]
pub enum TaskConfig {
    Build(BuildConfig),
    Deploy(DeployConfig),
}

/// Configuration of a `build` task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub image_name: String,
    #[serde(default)]
    pub image_tag: String,
    /// Build arguments, a `None` value passes the variable through from the builder
    #[serde(default)]
    pub args: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub dockerfile: Option<String>,
    pub repo_url: String,
    pub repo_name: String,
    #[serde(default)]
    pub repo_branch: String,
}

impl BuildConfig {
    /// Branch to clone, falling back to [`DEFAULT_BRANCH`]
    pub fn branch(&self) -> &str {
        if self.repo_branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            &self.repo_branch
        }
    }

    /// `name:tag` reference of the image produced by this build
    pub fn image_ref(&self) -> String {
        image_ref(&self.image_name, &self.image_tag)
    }
}

/// Restart policy of a deployed container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartPolicy {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "maxiumRetryCount")]
    pub maximum_retry_count: u32,
}

impl RestartPolicy {
    /// Policy name, falling back to [`DEFAULT_RESTART_POLICY`]
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_RESTART_POLICY
        } else {
            &self.name
        }
    }
}

/// Configuration of a `deploy` task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    pub image_name: String,
    #[serde(default)]
    pub image_tag: String,
    #[serde(default)]
    pub service_name: String,
    /// Host path -> container path bind mounts
    #[serde(default)]
    pub volume_mounts: BTreeMap<String, String>,
    /// Path -> content of files written before the container starts
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    #[serde(default)]
    pub auto_remove: bool,
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    #[serde(default)]
    pub env: Vec<String>,
    /// Container port -> host port
    #[serde(default)]
    pub ports: BTreeMap<String, String>,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl DeployConfig {
    /// `name:tag` reference of the image to run
    pub fn image_ref(&self) -> String {
        image_ref(&self.image_name, &self.image_tag)
    }

    /// Network to attach to, preferring the name over the id
    pub fn network(&self) -> Option<&str> {
        [self.network_name.as_str(), self.network_id.as_str()]
            .into_iter()
            .find(|n| !n.is_empty())
    }

    /// Command override split on whitespace, `None` keeps the image default
    pub fn command_args(&self) -> Option<Vec<String>> {
        let args: Vec<String> = self
            .command
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if args.is_empty() { None } else { Some(args) }
    }
}

fn image_ref(name: &str, tag: &str) -> String {
    let tag = if tag.is_empty() { DEFAULT_IMAGE_TAG } else { tag };
    format!("{}:{}", name, tag)
}
