//! Fake source control for testing

use super::{SourceControl, SourceControlError};
use crate::config::Credentials;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Recorded clone call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneCall {
    pub path: PathBuf,
    pub url: String,
    pub branch: String,
    pub username: Option<String>,
}

/// Fake source control that materializes a tiny working tree on clone
#[derive(Clone, Default)]
pub struct FakeSourceControl {
    calls: Arc<Mutex<Vec<CloneCall>>>,
    fail: bool,
}

impl FakeSourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source control whose clones always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<CloneCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn clone_repo(
        &self,
        path: &Path,
        url: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), SourceControlError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CloneCall {
                path: path.to_path_buf(),
                url: url.to_string(),
                branch: branch.to_string(),
                username: credentials.map(|c| c.username.clone()),
            });

        if self.fail {
            return Err(SourceControlError::CloneFailed {
                url: url.to_string(),
                stderr: "fatal: repository not found".to_string(),
            });
        }

        tokio::fs::create_dir_all(path)
            .await
            .map_err(SourceControlError::Spawn)?;
        tokio::fs::write(path.join("Dockerfile"), "FROM scratch\n")
            .await
            .map_err(SourceControlError::Spawn)?;
        Ok(())
    }
}
