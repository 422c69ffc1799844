//! Execution service
//!
//! Runs a single task against the local host:
//! - `build`: clone the sources, archive them into a build context, build
//!   and push the image
//! - `deploy`: write inline files, prepare volume directories, then replace
//!   the service container with a fresh one from the pulled image
//!
//! This service contains the core business logic of the agent. It knows
//! nothing about timeouts or status reporting; the orchestrator owns those.

use async_trait::async_trait;
use deploybot_core::domain::task::{BuildConfig, DeployConfig, Task, TaskConfig, TaskKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Credentials};
use crate::fsutil;
use crate::runtime::{BuildOptions, ContainerRuntime, ContainerSpec, RuntimeError};
use crate::source::{SourceControl, SourceControlError};

/// Errors that fail a task
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("invalid {kind} configuration: {source}")]
    Decode {
        kind: TaskKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {kind} configuration: {message}")]
    InvalidConfig { kind: TaskKind, message: String },

    #[error(transparent)]
    SourceControl(#[from] SourceControlError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutionError {
    /// Whether the task payload itself was at fault
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::InvalidConfig { .. })
    }

    fn filesystem(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Service trait for executing tasks
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Executes a task to completion
    ///
    /// # Arguments
    /// * `task` - The task fetched from the control plane
    /// * `arguments` - Arguments carried by the triggering webhook
    async fn execute(&self, task: &Task, arguments: &[String]) -> Result<(), ExecutionError>;
}

/// Host-specific knobs of task execution
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// Root under which build sources are cloned
    pub workspace_dir: PathBuf,
    /// Git credentials for private repositories
    pub repo_credentials: Option<Credentials>,
    /// Wait for the deployed container to start instead of handing it off
    pub await_deploy_start: bool,
}

impl ExecutionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workspace_dir: config.workspace_dir.clone(),
            repo_credentials: config.repo_credentials.clone(),
            await_deploy_start: config.await_deploy_start,
        }
    }
}

/// Standard implementation of ExecutionService
pub struct StandardExecutionService {
    runtime: Arc<dyn ContainerRuntime>,
    source: Arc<dyn SourceControl>,
    settings: ExecutionSettings,
}

impl StandardExecutionService {
    /// Creates a new standard execution service
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        source: Arc<dyn SourceControl>,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            runtime,
            source,
            settings,
        }
    }

    /// Working directory of a `(repoName, branch)` pair
    fn clone_dir(&self, config: &BuildConfig) -> PathBuf {
        self.settings
            .workspace_dir
            .join(format!("{}_{}", config.repo_name, config.branch()))
    }

    async fn build(&self, config: BuildConfig) -> Result<(), ExecutionError> {
        let branch = config.branch();
        let path = self.clone_dir(&config);
        let image = config.image_ref();

        info!("Building {} from {} ({})", image, config.repo_url, branch);

        fsutil::remove_dir_if_exists(&path)
            .await
            .map_err(ExecutionError::filesystem(&path))?;

        self.source
            .clone_repo(
                &path,
                &config.repo_url,
                branch,
                self.settings.repo_credentials.as_ref(),
            )
            .await?;

        let context = fsutil::archive_dir(&path)
            .await
            .map_err(|source| ExecutionError::Archive {
                path: path.clone(),
                source,
            })?;

        let options = BuildOptions {
            tag: image.clone(),
            dockerfile: config.dockerfile.clone(),
            build_args: config.args.clone(),
        };
        self.runtime.build_image(context, &options).await?;

        self.runtime.push_image(&image).await?;

        info!("Built and pushed {}", image);
        Ok(())
    }

    async fn deploy(&self, config: DeployConfig) -> Result<(), ExecutionError> {
        if config.service_name.is_empty() {
            return Err(ExecutionError::InvalidConfig {
                kind: TaskKind::Deploy,
                message: "serviceName is required".to_string(),
            });
        }

        for (path, content) in &config.files {
            let path = Path::new(path);
            fsutil::write_file(path, content)
                .await
                .map_err(ExecutionError::filesystem(path))?;
        }

        for source in config.volume_mounts.keys() {
            let path = Path::new(source);
            fsutil::ensure_directory(path)
                .await
                .map_err(ExecutionError::filesystem(path))?;
        }

        let spec = container_spec(&config);
        let name = spec.name.clone();

        info!("Deploying {} as {}", spec.image, name);

        // The container may not exist yet
        if let Err(e) = self.runtime.stop_container(&name).await {
            debug!("Container {} not stopped: {}", name, e);
        }
        if let Err(e) = self.runtime.remove_container(&name, true).await {
            debug!("Container {} not removed: {}", name, e);
        }

        self.runtime.pull_image(&spec.image).await?;
        let id = self.runtime.create_container(&spec).await?;
        debug!("Created container {} ({})", name, id);

        if self.settings.await_deploy_start {
            self.runtime.start_container(&name).await?;
            info!("Started container {}", name);
        } else {
            let runtime = Arc::clone(&self.runtime);
            tokio::spawn(async move {
                match runtime.start_container(&name).await {
                    Ok(()) => info!("Started container {}", name),
                    Err(e) => error!("Failed to start container {}: {}", name, e),
                }
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ExecutionService for StandardExecutionService {
    async fn execute(&self, task: &Task, arguments: &[String]) -> Result<(), ExecutionError> {
        info!(
            "Starting execution of {} task {} - pipeline {}",
            task.kind, task.id, task.pipeline_id
        );
        if !arguments.is_empty() {
            debug!("Task {} arguments: {:?}", task.id, arguments);
        }

        let config = task
            .decode_config()
            .map_err(|source| ExecutionError::Decode {
                kind: task.kind,
                source,
            })?;

        let result = match config {
            TaskConfig::Build(config) => self.build(config).await,
            TaskConfig::Deploy(config) => self.deploy(config).await,
        };

        if let Err(e) = &result {
            if e.is_config_error() {
                warn!("Task {} rejected: {}", task.id, e);
            } else {
                error!("Task {} failed: {}", task.id, e);
            }
        }

        result
    }
}

/// Maps a deploy configuration onto a runtime container spec
fn container_spec(config: &DeployConfig) -> ContainerSpec {
    ContainerSpec {
        name: config.service_name.clone(),
        image: config.image_ref(),
        env: config.env.clone(),
        ports: config.ports.clone(),
        mounts: config.volume_mounts.clone(),
        network: config.network().map(str::to_string),
        restart_policy: config.restart_policy.name().to_string(),
        restart_max_retries: config.restart_policy.maximum_retry_count,
        auto_remove: config.auto_remove,
        links: config.links.clone(),
        command: config.command_args(),
    }
}
