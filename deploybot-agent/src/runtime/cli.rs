//! Docker-compatible CLI runtime
//!
//! Drives `docker` (or a drop-in replacement such as `podman`) as a child
//! process for every runtime operation:
//! - Image pull, build (tar context on stdin) and push
//! - Container create/start/stop/remove/restart, logs and inspection
//! - Network management and host cleanup

use async_trait::async_trait;
use deploybot_core::domain::host::Network;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::{BuildOptions, ContainerRuntime, ContainerSpec, LogsOptions, Result, RuntimeError};
use crate::config::Credentials;

/// Container runtime backed by a docker-compatible command line tool
pub struct CliRuntime {
    /// Runtime binary, e.g. "docker"
    binary: String,
    /// Exported as DOCKER_HOST when set
    docker_host: Option<String>,
    /// Used to log in before pushing
    registry_credentials: Option<Credentials>,
}

impl CliRuntime {
    /// Creates a new CLI runtime
    ///
    /// # Arguments
    /// * `binary` - Runtime executable name or path
    /// * `docker_host` - Engine endpoint, `None` uses the CLI's default
    /// * `registry_credentials` - Credentials for `login` before `push`
    pub fn new(
        binary: impl Into<String>,
        docker_host: Option<String>,
        registry_credentials: Option<Credentials>,
    ) -> Self {
        Self {
            binary: binary.into(),
            docker_host,
            registry_credentials,
        }
    }

    /// Runs the CLI and returns its stdout
    async fn run(&self, args: Vec<String>) -> Result<String> {
        self.run_with_input(args, None).await
    }

    /// Runs the CLI feeding `input` on stdin and returns its stdout
    async fn run_with_input(&self, args: Vec<String>, input: Option<Vec<u8>>) -> Result<String> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        debug!("Running {}", command_line);

        let mut command = Command::new(&self.binary);
        command
            .args(&args)
            .env("DOCKER_BUILDKIT", "1")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        if let Some(host) = &self.docker_host {
            command.env("DOCKER_HOST", host);
        }

        let spawn_error = |source| RuntimeError::Spawn {
            program: self.binary.clone(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_error)?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout pipe and stall
        let writer = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => Some(tokio::spawn(async move {
                let result = stdin.write_all(&input).await;
                drop(stdin);
                result
            })),
            _ => None,
        };

        let output = child.wait_with_output().await.map_err(spawn_error)?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) => debug!("Failed to write stdin of {}: {}", command_line, e),
                Err(e) => debug!("Stdin writer of {} aborted: {}", command_line, e),
                Ok(Ok(())) => {}
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", command_line, stderr.trim());
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            error!(
                "Command failed: {} exit_code={} stderr='{}'",
                command_line,
                code,
                stderr.trim()
            );
            return Err(RuntimeError::CommandFailed {
                command: command_line,
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }

    /// Logs in to the registry hosting `image` when credentials are configured
    async fn login_for(&self, image: &str) -> Result<()> {
        let Some(credentials) = &self.registry_credentials else {
            return Ok(());
        };

        let mut args = vec![
            "login".to_string(),
            "--username".to_string(),
            credentials.username.clone(),
            "--password-stdin".to_string(),
        ];
        if let Some(registry) = registry_host(image) {
            args.push(registry.to_string());
        }

        self.run_with_input(args, Some(credentials.password.expose().as_bytes().to_vec()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn pull_image(&self, image: &str) -> Result<()> {
        info!("Pulling image {}", image);
        self.run(vec!["pull".to_string(), image.to_string()]).await?;
        Ok(())
    }

    async fn build_image(&self, context: Vec<u8>, options: &BuildOptions) -> Result<()> {
        info!(
            "Building image {} from a {} byte context",
            options.tag,
            context.len()
        );
        let stdout = self.run_with_input(build_args(options), Some(context)).await?;
        debug!("Build output for {}: {}", options.tag, stdout.trim());
        Ok(())
    }

    async fn push_image(&self, image: &str) -> Result<()> {
        self.login_for(image).await?;
        info!("Pushing image {}", image);
        self.run(vec!["push".to_string(), image.to_string()]).await?;
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        info!("Creating container {} from {}", spec.name, spec.image);
        let stdout = self.run(create_args(spec)).await?;
        let id = stdout.trim().to_string();
        if id.is_empty() {
            return Err(RuntimeError::InvalidOutput(format!(
                "create of {} returned no container id",
                spec.name
            )));
        }
        Ok(id)
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        info!("Starting container {}", name);
        self.run(vec!["start".to_string(), name.to_string()]).await?;
        Ok(())
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        self.run(vec!["stop".to_string(), name.to_string()]).await?;
        Ok(())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<()> {
        let mut args = vec!["rm".to_string()];
        if force {
            args.push("-f".to_string());
        }
        args.push(name.to_string());
        self.run(args).await?;
        Ok(())
    }

    async fn restart_container(&self, name: &str) -> Result<()> {
        info!("Restarting container {}", name);
        self.run(vec!["restart".to_string(), name.to_string()]).await?;
        Ok(())
    }

    async fn container_logs(&self, name: &str, options: &LogsOptions) -> Result<String> {
        let mut args = logs_args(options);
        args.push(name.to_string());

        // Logs are read directly rather than through `run` to keep stderr lines
        let output = Command::new(&self.binary)
            .args(&args)
            .envs(self.docker_host.iter().map(|host| ("DOCKER_HOST", host)))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RuntimeError::Spawn {
                program: self.binary.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                command: format!("{} {}", self.binary, args.join(" ")),
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&stderr);
        Ok(combined)
    }

    async fn inspect_container(&self, name: &str) -> Result<serde_json::Value> {
        let stdout = self
            .run(vec![
                "inspect".to_string(),
                "--type".to_string(),
                "container".to_string(),
                name.to_string(),
            ])
            .await?;

        let mut entries: Vec<serde_json::Value> = serde_json::from_str(&stdout)
            .map_err(|e| RuntimeError::InvalidOutput(format!("inspect of {}: {}", name, e)))?;

        if entries.is_empty() {
            return Err(RuntimeError::InvalidOutput(format!(
                "inspect of {} returned nothing",
                name
            )));
        }
        Ok(entries.swap_remove(0))
    }

    async fn list_containers(&self) -> Result<Vec<serde_json::Value>> {
        let stdout = self
            .run(vec![
                "ps".to_string(),
                "--no-trunc".to_string(),
                "--format".to_string(),
                "{{json .}}".to_string(),
            ])
            .await?;

        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| RuntimeError::InvalidOutput(format!("ps: {}", e)))
            })
            .collect()
    }

    async fn list_networks(&self) -> Result<Vec<Network>> {
        let stdout = self
            .run(vec![
                "network".to_string(),
                "ls".to_string(),
                "--no-trunc".to_string(),
                "--format".to_string(),
                "{{.Name}}\t{{.ID}}".to_string(),
            ])
            .await?;

        Ok(parse_networks(&stdout))
    }

    async fn network_id(&self, name: &str) -> Result<String> {
        let stdout = self
            .run(vec![
                "network".to_string(),
                "inspect".to_string(),
                "--format".to_string(),
                "{{.Id}}".to_string(),
                name.to_string(),
            ])
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn create_network(&self, name: &str) -> Result<String> {
        info!("Creating network {}", name);
        let stdout = self
            .run(vec![
                "network".to_string(),
                "create".to_string(),
                "--driver".to_string(),
                "bridge".to_string(),
                name.to_string(),
            ])
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn remove_network(&self, name: &str) -> Result<()> {
        info!("Removing network {}", name);
        self.run(vec![
            "network".to_string(),
            "rm".to_string(),
            name.to_string(),
        ])
        .await?;
        Ok(())
    }

    async fn remove_images(&self) -> Result<()> {
        let stdout = self
            .run(vec![
                "images".to_string(),
                "-q".to_string(),
                "--no-trunc".to_string(),
            ])
            .await?;

        let mut ids: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            debug!("No images to remove");
            return Ok(());
        }

        info!("Removing {} image(s)", ids.len());
        let mut args = vec!["rmi".to_string(), "-f".to_string()];
        args.extend(ids);
        self.run(args).await?;
        Ok(())
    }

    async fn prune_builder_cache(&self) -> Result<()> {
        info!("Pruning builder cache");
        let stdout = self
            .run(vec![
                "builder".to_string(),
                "prune".to_string(),
                "-f".to_string(),
            ])
            .await?;
        debug!("Builder prune: {}", stdout.trim());
        Ok(())
    }
}

/// Arguments of `build` reading the context tarball from stdin
fn build_args(options: &BuildOptions) -> Vec<String> {
    let mut args = vec!["build".to_string(), "-t".to_string(), options.tag.clone()];

    if let Some(dockerfile) = options.dockerfile.as_deref().filter(|d| !d.is_empty()) {
        args.push("-f".to_string());
        args.push(dockerfile.to_string());
    }

    for (name, value) in &options.build_args {
        args.push("--build-arg".to_string());
        match value {
            Some(value) => args.push(format!("{}={}", name, value)),
            None => args.push(name.clone()),
        }
    }

    args.push("-".to_string());
    args
}

/// Arguments of `create` for a service container
fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec!["create".to_string(), "--name".to_string(), spec.name.clone()];

    // The engine rejects a restart policy on auto-removed containers
    if spec.auto_remove {
        args.push("--rm".to_string());
    } else {
        args.push("--restart".to_string());
        if spec.restart_policy == "on-failure" && spec.restart_max_retries > 0 {
            args.push(format!("on-failure:{}", spec.restart_max_retries));
        } else {
            args.push(spec.restart_policy.clone());
        }
    }

    for var in &spec.env {
        args.push("-e".to_string());
        args.push(var.clone());
    }

    for (container_port, host_port) in &spec.ports {
        args.push("-p".to_string());
        args.push(format!("{}:{}/tcp", host_port, container_port));
    }

    for (source, target) in &spec.mounts {
        args.push("--mount".to_string());
        args.push(format!("type=bind,source={},target={}", source, target));
    }

    if let Some(network) = &spec.network {
        args.push("--network".to_string());
        args.push(network.clone());
    }

    for link in &spec.links {
        args.push("--link".to_string());
        args.push(link.clone());
    }

    args.push(spec.image.clone());

    if let Some(command) = &spec.command {
        args.extend(command.iter().cloned());
    }

    args
}

/// Arguments of `logs`, without the container name
fn logs_args(options: &LogsOptions) -> Vec<String> {
    let mut args = vec!["logs".to_string()];

    if let Some(tail) = &options.tail {
        args.push("--tail".to_string());
        args.push(tail.clone());
    }
    if let Some(since) = &options.since {
        args.push("--since".to_string());
        args.push(since.clone());
    }
    if let Some(until) = &options.until {
        args.push("--until".to_string());
        args.push(until.clone());
    }
    if options.timestamps {
        args.push("--timestamps".to_string());
    }
    if options.details {
        args.push("--details".to_string());
    }

    args
}

/// Parses `network ls` output formatted as `name<TAB>id`
fn parse_networks(output: &str) -> Vec<Network> {
    output
        .lines()
        .filter_map(|line| {
            let (name, id) = line.trim().split_once('\t')?;
            Some(Network {
                name: name.to_string(),
                id: id.to_string(),
            })
        })
        .collect()
}

/// Registry host of an image reference, `None` for Docker Hub
fn registry_host(image: &str) -> Option<&str> {
    let (first, _) = image.split_once('/')?;
    if first.contains('.') || first.contains(':') || first == "localhost" {
        Some(first)
    } else {
        None
    }
}
