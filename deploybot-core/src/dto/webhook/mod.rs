//! Webhook DTOs

use serde::{Deserialize, Serialize};

use crate::dto::{CODE_CLIENT_ERROR, CODE_SERVER_ERROR, CODE_SUCCESS};

/// Body of an inbound stream webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamWebhook {
    pub payload: StreamWebhookPayload,
}

/// Task reference carried by a stream webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamWebhookPayload {
    pub pipeline_id: String,
    pub task_id: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Acknowledgement returned to the webhook caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub code: i32,
    pub msg: String,
}

impl WebhookResponse {
    pub fn accepted() -> Self {
        Self {
            code: CODE_SUCCESS,
            msg: String::new(),
        }
    }

    pub fn client_error(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_CLIENT_ERROR,
            msg: msg.into(),
        }
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_SERVER_ERROR,
            msg: msg.into(),
        }
    }
}
