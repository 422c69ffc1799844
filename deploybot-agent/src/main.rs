//! Deploybot Agent
//!
//! A host-local worker that builds and deploys container images when the
//! control plane triggers it through a webhook.
//!
//! Architecture:
//! - Configuration: Load settings from the environment
//! - Repositories: HTTP communication with the control plane
//! - Runtime / Source: Container engine and git collaborators behind traits
//! - Services: Task execution and status reporting
//! - Scheduler: Timeout timer, terminal status gate and task lifecycle
//! - API: Webhook intake and host management endpoints
//!
//! Every accepted webhook resolves its task from the control plane, reports
//! `IN_PROGRESS`, runs the task in the background and reports exactly one
//! terminal status.

mod api;
mod config;
mod fsutil;
mod repository;
mod runtime;
mod scheduler;
mod service;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deploybot_client::ControlPlaneClient;
use deploybot_core::queue::EventQueue;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::repository::{HttpTaskRepository, TaskRepository};
use crate::runtime::{CliRuntime, ContainerRuntime};
use crate::scheduler::TaskOrchestrator;
use crate::service::{
    ControlPlaneReporter, ExecutionSettings, RetryPolicy, StandardExecutionService,
};
use crate::source::GitCli;

#[derive(Parser)]
#[command(name = "deploybot-agent")]
#[command(about = "Webhook-driven build and deploy agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands
#[derive(Subcommand)]
enum Commands {
    /// Start the agent's HTTP server
    Start,
    /// Print the agent version
    Version,
    /// Print the resolved configuration, secrets redacted
    Env,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("deploybot-agent {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Env => {
            let config = load_config()?;
            println!("{:#?}", config);
            Ok(())
        }
        Commands::Start => {
            init_tracing();
            run(load_config()?).await
        }
    }
}

/// Initialize logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deploybot_agent=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Loads configuration from environment variables and validates it
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Wires the services together and serves the API until shutdown
async fn run(config: Config) -> Result<()> {
    info!("Starting Deploybot Agent");
    info!(
        "Loaded configuration: api_base_url={}, container_cli={}, workspace_dir={}",
        config.api_base_url,
        config.container_cli,
        config.workspace_dir.display()
    );

    // Initialize control plane client
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let client = ControlPlaneClient::with_client(
        config.api_base_url.clone(),
        config.api_key.expose(),
        http_client,
    );
    let tasks: Arc<dyn TaskRepository> = Arc::new(HttpTaskRepository::new(client));

    info!("Control plane client initialized");

    // Initialize collaborators and services
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(CliRuntime::new(
        config.container_cli.clone(),
        config.docker_host.clone(),
        config.registry_credentials.clone(),
    ));
    let executor = StandardExecutionService::new(
        Arc::clone(&runtime),
        Arc::new(GitCli::new()),
        ExecutionSettings::from_config(&config),
    );
    let reporter = ControlPlaneReporter::new(
        Arc::clone(&tasks),
        RetryPolicy::with_attempts(config.status_report_attempts),
    );
    let orchestrator = TaskOrchestrator::new(Arc::new(executor), Arc::new(reporter));

    info!("Services initialized");

    let state = AppState {
        tasks,
        orchestrator: Arc::new(orchestrator),
        runtime,
        events: Arc::new(EventQueue::new()),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
