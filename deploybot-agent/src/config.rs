//! Agent configuration
//!
//! Defines all configurable parameters for the agent: the listening address,
//! control-plane connection, container runtime and registry access, git
//! credentials, and the knobs of task execution and status reporting.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A value that must never end up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "\"\"")
        } else {
            write!(f, "\"***\"")
        }
    }
}

/// Username/password pair for a registry or a git host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (e.g., "0.0.0.0:8080")
    pub bind_addr: String,

    /// Control plane base URL (e.g., "https://api.example.com")
    pub api_base_url: String,

    /// Credential sent to the control plane
    pub api_key: Secret,

    /// Container runtime endpoint, exported as DOCKER_HOST to the runtime CLI
    pub docker_host: Option<String>,

    /// Container runtime binary ("docker" or a compatible CLI such as "podman")
    pub container_cli: String,

    /// Image registry credentials used before pushing built images
    pub registry_credentials: Option<Credentials>,

    /// Git credentials used when cloning build sources
    pub repo_credentials: Option<Credentials>,

    /// Directory build sources are cloned into
    pub workspace_dir: PathBuf,

    /// Attempts made for each status report before giving up
    pub status_report_attempts: u32,

    /// Timeout of a single control-plane request
    pub request_timeout: Duration,

    /// Wait for the deployed container to start before reporting the task done
    pub await_deploy_start: bool,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_base_url: String, api_key: String) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_base_url,
            api_key: Secret::new(api_key),
            docker_host: None,
            container_cli: "docker".to_string(),
            registry_credentials: None,
            repo_credentials: None,
            workspace_dir: PathBuf::from("/var/temp"),
            status_report_attempts: 3,
            request_timeout: Duration::from_secs(10),
            await_deploy_start: false,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - API_BASE_URL (required)
    /// - API_KEY (required)
    /// - SERVICE_PORT (optional, bind address, default: 0.0.0.0:8080)
    /// - DOCKER_HOST (optional)
    /// - CONTAINER_CLI (optional, default: docker)
    /// - DH_USERNAME / DH_PASSWORD (optional, registry credentials)
    /// - REPO_USERNAME / REPO_PASSWORD (optional, git credentials)
    /// - WORKSPACE_DIR (optional, default: /var/temp)
    /// - STATUS_REPORT_ATTEMPTS (optional, default: 3)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 10)
    /// - AWAIT_DEPLOY_START (optional, default: false)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let api_base_url = var("API_BASE_URL")
            .ok_or_else(|| anyhow::anyhow!("API_BASE_URL environment variable not set"))?;

        let api_key = var("API_KEY")
            .ok_or_else(|| anyhow::anyhow!("API_KEY environment variable not set"))?;

        let mut config = Self::new(api_base_url, api_key);

        if let Some(bind_addr) = var("SERVICE_PORT") {
            config.bind_addr = normalize_bind_addr(&bind_addr);
        }

        config.docker_host = var("DOCKER_HOST");

        if let Some(cli) = var("CONTAINER_CLI") {
            config.container_cli = cli;
        }

        config.registry_credentials = credentials(var("DH_USERNAME"), var("DH_PASSWORD"));
        config.repo_credentials = credentials(var("REPO_USERNAME"), var("REPO_PASSWORD"));

        if let Some(dir) = var("WORKSPACE_DIR") {
            config.workspace_dir = PathBuf::from(dir);
        }

        config.status_report_attempts = var("STATUS_REPORT_ATTEMPTS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(config.status_report_attempts);

        config.request_timeout = var("REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.request_timeout);

        config.await_deploy_start = var("AWAIT_DEPLOY_START")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.is_empty() {
            anyhow::bail!("api_base_url cannot be empty");
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!("api_base_url must start with http:// or https://");
        }

        if self.api_key.is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if self.container_cli.is_empty() {
            anyhow::bail!("container_cli cannot be empty");
        }

        if self.status_report_attempts == 0 {
            anyhow::bail!("status_report_attempts must be greater than 0");
        }

        // Status posts must settle well within the shortest task timeout (1 minute)
        if self.request_timeout.as_secs() == 0 || self.request_timeout >= Duration::from_secs(60) {
            anyhow::bail!("request_timeout must be between 1 and 59 seconds");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:9000".to_string(), "changeme".to_string())
    }
}

/// Accepts both a bare port (":8080", "8080") and a full address
fn normalize_bind_addr(value: &str) -> String {
    if let Some(port) = value.strip_prefix(':') {
        format!("0.0.0.0:{}", port)
    } else if value.chars().all(|c| c.is_ascii_digit()) {
        format!("0.0.0.0:{}", value)
    } else {
        value.to_string()
    }
}

fn credentials(username: Option<String>, password: Option<String>) -> Option<Credentials> {
    username.map(|username| Credentials {
        username,
        password: Secret::new(password.unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.container_cli, "docker");
        assert_eq!(config.workspace_dir, PathBuf::from("/var/temp"));
        assert_eq!(config.status_report_attempts, 3);
        assert!(!config.await_deploy_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api_base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
        config.api_base_url = "https://api.example.com".to_string();

        config.api_key = Secret::new("");
        assert!(config.validate().is_err());
        config.api_key = Secret::new("key");

        config.status_report_attempts = 0;
        assert!(config.validate().is_err());
        config.status_report_attempts = 1;

        config.request_timeout = Duration::from_secs(60);
        assert!(config.validate().is_err());
        config.request_timeout = Duration::from_secs(5);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_requires_control_plane() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("API_BASE_URL", "http://cp")])).is_err());
        assert!(Config::from_lookup(lookup(&[("API_KEY", "key")])).is_err());
    }

    #[test]
    fn test_from_lookup_reads_all_settings() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "https://cp.example.com"),
            ("API_KEY", "key"),
            ("SERVICE_PORT", ":8443"),
            ("DOCKER_HOST", "unix:///var/run/docker.sock"),
            ("CONTAINER_CLI", "podman"),
            ("DH_USERNAME", "hub-user"),
            ("DH_PASSWORD", "hub-pass"),
            ("REPO_USERNAME", "git-user"),
            ("WORKSPACE_DIR", "/tmp/builds"),
            ("STATUS_REPORT_ATTEMPTS", "5"),
            ("REQUEST_TIMEOUT", "3"),
            ("AWAIT_DEPLOY_START", "true"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8443");
        assert_eq!(config.api_key.expose(), "key");
        assert_eq!(
            config.docker_host.as_deref(),
            Some("unix:///var/run/docker.sock")
        );
        assert_eq!(config.container_cli, "podman");
        let registry = config.registry_credentials.as_ref().unwrap();
        assert_eq!(registry.username, "hub-user");
        assert_eq!(registry.password.expose(), "hub-pass");
        let repo = config.repo_credentials.as_ref().unwrap();
        assert_eq!(repo.username, "git-user");
        assert!(repo.password.is_empty());
        assert_eq!(config.workspace_dir, PathBuf::from("/tmp/builds"));
        assert_eq!(config.status_report_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(config.await_deploy_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secrets_are_redacted_in_debug_output() {
        let mut config = Config::default();
        config.registry_credentials = Some(Credentials {
            username: "hub-user".to_string(),
            password: Secret::new("hunter2"),
        });

        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("changeme"));
        assert!(printed.contains("hub-user"));
    }

    #[test]
    fn test_normalize_bind_addr() {
        assert_eq!(normalize_bind_addr(":8080"), "0.0.0.0:8080");
        assert_eq!(normalize_bind_addr("9000"), "0.0.0.0:9000");
        assert_eq!(normalize_bind_addr("127.0.0.1:8080"), "127.0.0.1:8080");
    }
}
