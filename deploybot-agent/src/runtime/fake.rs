//! Fake container runtime for testing

use super::{BuildOptions, ContainerRuntime, ContainerSpec, LogsOptions, Result, RuntimeError};
use async_trait::async_trait;
use deploybot_core::domain::host::Network;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Pull(String),
    Build { options: BuildOptions, context_len: usize },
    Push(String),
    Create(ContainerSpec),
    Start(String),
    Stop(String),
    Remove { name: String, force: bool },
    Restart(String),
    Logs { name: String, options: LogsOptions },
    Inspect(String),
    ListContainers,
    ListNetworks,
    NetworkId(String),
    CreateNetwork(String),
    RemoveNetwork(String),
    RemoveImages,
    PruneBuilderCache,
}

impl RuntimeCall {
    /// Operation name used to inject failures
    fn operation(&self) -> &'static str {
        match self {
            RuntimeCall::Pull(_) => "pull",
            RuntimeCall::Build { .. } => "build",
            RuntimeCall::Push(_) => "push",
            RuntimeCall::Create(_) => "create",
            RuntimeCall::Start(_) => "start",
            RuntimeCall::Stop(_) => "stop",
            RuntimeCall::Remove { .. } => "rm",
            RuntimeCall::Restart(_) => "restart",
            RuntimeCall::Logs { .. } => "logs",
            RuntimeCall::Inspect(_) => "inspect",
            RuntimeCall::ListContainers => "ps",
            RuntimeCall::ListNetworks => "network ls",
            RuntimeCall::NetworkId(_) => "network inspect",
            RuntimeCall::CreateNetwork(_) => "network create",
            RuntimeCall::RemoveNetwork(_) => "network rm",
            RuntimeCall::RemoveImages => "rmi",
            RuntimeCall::PruneBuilderCache => "builder prune",
        }
    }
}

/// Fake runtime recording every call
#[derive(Clone, Default)]
pub struct FakeRuntime {
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
    networks: Arc<Mutex<Vec<Network>>>,
    hang_pull: bool,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose image pulls never complete
    pub fn with_hanging_pull() -> Self {
        Self {
            hang_pull: true,
            ..Self::default()
        }
    }

    /// Makes every later call of `operation` (e.g. "pull", "rm") fail
    pub fn fail(&self, operation: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation);
    }

    /// Registers an existing network
    pub fn add_network(&self, name: &str, id: &str) {
        self.networks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Network {
                name: name.to_string(),
                id: id.to_string(),
            });
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of the recorded operations, in call order
    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().iter().map(RuntimeCall::operation).collect()
    }

    fn record(&self, call: RuntimeCall) -> Result<()> {
        let operation = call.operation();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        if self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(operation)
        {
            return Err(RuntimeError::CommandFailed {
                command: format!("docker {}", operation),
                code: 1,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn pull_image(&self, image: &str) -> Result<()> {
        self.record(RuntimeCall::Pull(image.to_string()))?;
        if self.hang_pull {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn build_image(&self, context: Vec<u8>, options: &BuildOptions) -> Result<()> {
        self.record(RuntimeCall::Build {
            options: options.clone(),
            context_len: context.len(),
        })
    }

    async fn push_image(&self, image: &str) -> Result<()> {
        self.record(RuntimeCall::Push(image.to_string()))
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        self.record(RuntimeCall::Create(spec.clone()))?;
        Ok(format!("{}-id", spec.name))
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        self.record(RuntimeCall::Start(name.to_string()))
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        self.record(RuntimeCall::Stop(name.to_string()))
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<()> {
        self.record(RuntimeCall::Remove {
            name: name.to_string(),
            force,
        })
    }

    async fn restart_container(&self, name: &str) -> Result<()> {
        self.record(RuntimeCall::Restart(name.to_string()))
    }

    async fn container_logs(&self, name: &str, options: &LogsOptions) -> Result<String> {
        self.record(RuntimeCall::Logs {
            name: name.to_string(),
            options: options.clone(),
        })?;
        Ok(format!("{} started\n", name))
    }

    async fn inspect_container(&self, name: &str) -> Result<serde_json::Value> {
        self.record(RuntimeCall::Inspect(name.to_string()))?;
        Ok(serde_json::json!({ "Name": format!("/{}", name), "State": { "Running": true } }))
    }

    async fn list_containers(&self) -> Result<Vec<serde_json::Value>> {
        self.record(RuntimeCall::ListContainers)?;
        Ok(Vec::new())
    }

    async fn list_networks(&self) -> Result<Vec<Network>> {
        self.record(RuntimeCall::ListNetworks)?;
        Ok(self
            .networks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn network_id(&self, name: &str) -> Result<String> {
        self.record(RuntimeCall::NetworkId(name.to_string()))?;
        self.networks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|network| network.name == name)
            .map(|network| network.id.clone())
            .ok_or_else(|| RuntimeError::CommandFailed {
                command: "docker network inspect".to_string(),
                code: 1,
                stderr: format!("network {} not found", name),
            })
    }

    async fn create_network(&self, name: &str) -> Result<String> {
        self.record(RuntimeCall::CreateNetwork(name.to_string()))?;
        let id = format!("{}-id", name);
        self.add_network(name, &id);
        Ok(id)
    }

    async fn remove_network(&self, name: &str) -> Result<()> {
        self.record(RuntimeCall::RemoveNetwork(name.to_string()))?;
        self.networks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|network| network.name != name);
        Ok(())
    }

    async fn remove_images(&self) -> Result<()> {
        self.record(RuntimeCall::RemoveImages)
    }

    async fn prune_builder_cache(&self) -> Result<()> {
        self.record(RuntimeCall::PruneBuilderCache)
    }
}
