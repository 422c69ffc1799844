//! Webhook API Handler
//!
//! Entry point of task execution. The handler resolves the task from the
//! control plane, hands it to the orchestrator and acknowledges without
//! waiting for the task to finish.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use deploybot_client::ClientError;
use deploybot_core::domain::event::Event;
use deploybot_core::dto::MSG_CLIENT_ERROR;
use deploybot_core::dto::webhook::{StreamWebhook, WebhookResponse};
use tracing::{error, info, warn};

use crate::api::AppState;

/// POST /streamWebhook
/// Accept a task trigger
pub async fn stream_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    let webhook: StreamWebhook = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!("Rejected malformed webhook: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::client_error(e.to_string())),
            );
        }
    };

    let payload = webhook.payload;
    info!(
        "Webhook for task {} of pipeline {}",
        payload.task_id, payload.pipeline_id
    );

    let task = match state
        .tasks
        .fetch_task(&payload.pipeline_id, &payload.task_id)
        .await
    {
        Ok(task) => task,
        Err(e) => {
            if e.is_transport() {
                error!(
                    "Control plane unreachable fetching task {} of pipeline {}: {}",
                    payload.task_id, payload.pipeline_id, e
                );
            } else {
                warn!(
                    "Failed to fetch task {} of pipeline {}: {}",
                    payload.task_id, payload.pipeline_id, e
                );
            }
            return (StatusCode::BAD_REQUEST, Json(fetch_error_response(&e)));
        }
    };

    state.events.push_event(Event::new(
        payload.pipeline_id.clone(),
        payload.task_id.clone(),
        payload.arguments.clone(),
    ));

    // Execution continues in the background
    let _execution = state
        .orchestrator
        .dispatch(&payload.pipeline_id, task, payload.arguments)
        .await;

    (StatusCode::OK, Json(WebhookResponse::accepted()))
}

/// Maps a failed task fetch onto the caller-facing response
fn fetch_error_response(err: &ClientError) -> WebhookResponse {
    match err {
        ClientError::RequestFailed(_) | ClientError::ParseError(_) => {
            WebhookResponse::server_error(err.to_string())
        }
        ClientError::ApiError { .. } => WebhookResponse::client_error(MSG_CLIENT_ERROR),
    }
}
