//! Container runtime
//!
//! The agent never talks to the container engine directly: everything goes
//! through the [`ContainerRuntime`] trait so execution logic can be tested
//! against a fake. The shipped implementation drives a docker-compatible CLI.

mod cli;

#[cfg(test)]
mod fake;

pub use cli::CliRuntime;
#[cfg(test)]
pub use fake::{FakeRuntime, RuntimeCall};

use async_trait::async_trait;
use deploybot_core::domain::host::Network;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from container runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("unexpected runtime output: {0}")]
    InvalidOutput(String),
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Options of an image build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// `name:tag` applied to the built image
    pub tag: String,
    /// Dockerfile path inside the build context
    pub dockerfile: Option<String>,
    pub build_args: BTreeMap<String, Option<String>>,
}

/// Everything needed to create a service container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<String>,
    /// Container port -> host port, TCP
    pub ports: BTreeMap<String, String>,
    /// Host path -> container path bind mounts
    pub mounts: BTreeMap<String, String>,
    pub network: Option<String>,
    pub restart_policy: String,
    pub restart_max_retries: u32,
    pub auto_remove: bool,
    pub links: Vec<String>,
    pub command: Option<Vec<String>>,
}

/// Options of a container log query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogsOptions {
    pub tail: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub timestamps: bool,
    pub details: bool,
}

/// Container engine operations used by the agent
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Pulls an image by `name:tag`
    async fn pull_image(&self, image: &str) -> Result<()>;

    /// Builds an image from a tar build context
    async fn build_image(&self, context: Vec<u8>, options: &BuildOptions) -> Result<()>;

    /// Pushes an image to its registry
    async fn push_image(&self, image: &str) -> Result<()>;

    /// Creates a container and returns its id
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    async fn start_container(&self, name: &str) -> Result<()>;

    async fn stop_container(&self, name: &str) -> Result<()>;

    /// Removes a container, killing it first when `force` is set
    async fn remove_container(&self, name: &str, force: bool) -> Result<()>;

    async fn restart_container(&self, name: &str) -> Result<()>;

    /// Returns the combined stdout/stderr log of a container
    async fn container_logs(&self, name: &str, options: &LogsOptions) -> Result<String>;

    /// Returns the runtime's description of a container
    async fn inspect_container(&self, name: &str) -> Result<serde_json::Value>;

    /// Lists running containers
    async fn list_containers(&self) -> Result<Vec<serde_json::Value>>;

    async fn list_networks(&self) -> Result<Vec<Network>>;

    /// Resolves a network name to its id
    async fn network_id(&self, name: &str) -> Result<String>;

    /// Creates a bridge network and returns its id
    async fn create_network(&self, name: &str) -> Result<String>;

    async fn remove_network(&self, name: &str) -> Result<()>;

    /// Removes every local image
    async fn remove_images(&self) -> Result<()>;

    /// Drops the builder cache
    async fn prune_builder_cache(&self) -> Result<()>;
}
