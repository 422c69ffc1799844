//! Service API Handlers
//!
//! HTTP endpoints for the containers the agent deploys: inspection, run
//! state changes, removal and logs.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use deploybot_core::dto::api::{ApiResponse, UpdateServiceInput};
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::runtime::LogsOptions;

// =============================================================================
// Service Query Endpoints
// =============================================================================

/// GET /services
/// List running containers
pub async fn list_services(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<serde_json::Value>>>> {
    tracing::debug!("Listing services");

    let services = state.runtime.list_containers().await?;
    Ok(Json(ApiResponse::ok(services)))
}

/// GET /service/{name}
/// Inspect a container
pub async fn get_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let service = state.runtime.inspect_container(&name).await?;
    Ok(Json(ApiResponse::ok(service)))
}

/// Query of GET /serviceLogs
#[derive(Debug, Default, Deserialize)]
pub struct ServiceLogsQuery {
    pub name: Option<String>,
    pub tail: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub timestamps: Option<String>,
    pub details: Option<String>,
}

impl ServiceLogsQuery {
    fn options(&self) -> LogsOptions {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        LogsOptions {
            tail: non_empty(&self.tail),
            since: non_empty(&self.since),
            until: non_empty(&self.until),
            timestamps: self.timestamps.as_deref() == Some("true"),
            details: self.details.as_deref() == Some("true"),
        }
    }
}

/// GET /serviceLogs
/// Container logs as plain text
pub async fn service_logs(
    State(state): State<AppState>,
    Query(query): Query<ServiceLogsQuery>,
) -> ApiResult<String> {
    let name = query
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Container name is required".to_string()))?;

    let logs = state.runtime.container_logs(name, &query.options()).await?;
    Ok(logs)
}

// =============================================================================
// Service Lifecycle
// =============================================================================

/// PUT /service
/// Restart a container, or stop it when it should not be running
pub async fn update_service(
    State(state): State<AppState>,
    Json(input): Json<UpdateServiceInput>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if input.restarting {
        tracing::info!("Restarting service: {}", input.name);
        state.runtime.restart_container(&input.name).await?;
    } else if !input.running {
        tracing::info!("Stopping service: {}", input.name);
        state.runtime.stop_container(&input.name).await?;
    } else {
        tracing::debug!("Service {} left running", input.name);
    }

    Ok(Json(ApiResponse::empty()))
}

/// DELETE /service/{name}
/// Force-remove a container
pub async fn delete_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    tracing::info!("Removing service: {}", name);

    state.runtime.remove_container(&name, true).await?;
    Ok(Json(ApiResponse::empty()))
}
