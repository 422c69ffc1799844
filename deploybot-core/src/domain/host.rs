//! Host resource types
//!
//! Describe resources on the machine the agent runs on: container networks
//! and disk usage.

use serde::{Deserialize, Serialize};

/// A container network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub id: String,
}

/// Disk usage of the filesystem holding a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub total_size: u64,
    pub avail_size: u64,
    pub path: String,
}
