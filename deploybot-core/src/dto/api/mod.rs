//! Agent API DTOs
//!
//! Request and response bodies of the agent's host management endpoints.

use serde::{Deserialize, Serialize};

use crate::dto::{CODE_CLIENT_ERROR, CODE_SERVER_ERROR, CODE_SUCCESS};

/// Generic response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub payload: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: String::new(),
            payload: Some(payload),
        }
    }

    pub fn empty() -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: String::new(),
            payload: None,
        }
    }

    pub fn client_error(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_CLIENT_ERROR,
            msg: msg.into(),
            payload: None,
        }
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_SERVER_ERROR,
            msg: msg.into(),
            payload: None,
        }
    }
}

/// Request to create a network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNetworkInput {
    pub name: String,
}

/// Request to change the run state of a service container
///
/// `restarting` wins over `running`; a service that is neither is stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServiceInput {
    pub name: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub restarting: bool,
}
