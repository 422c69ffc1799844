//! Source control
//!
//! Build tasks fetch their sources through the [`SourceControl`] trait. The
//! shipped implementation drives the `git` command line.

mod git;

#[cfg(test)]
mod fake;

#[cfg(test)]
pub use fake::{CloneCall, FakeSourceControl};
pub use git::GitCli;

use crate::config::Credentials;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from source control operations
#[derive(Debug, Error)]
pub enum SourceControlError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("invalid repository url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("clone of {url} failed: {stderr}")]
    CloneFailed { url: String, stderr: String },
}

/// Fetches build sources
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Clones a single branch of `url` into `path`, submodules included
    async fn clone_repo(
        &self,
        path: &Path,
        url: &str,
        branch: &str,
        credentials: Option<&Credentials>,
    ) -> Result<(), SourceControlError>;
}
