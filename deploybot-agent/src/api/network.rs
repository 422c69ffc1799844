//! Network API Handlers
//!
//! HTTP endpoints for container network management.

use axum::{
    Json,
    extract::{Path, State},
};
use deploybot_core::domain::host::Network;
use deploybot_core::dto::api::{ApiResponse, CreateNetworkInput};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /networks
/// List all networks
pub async fn list_networks(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Network>>>> {
    tracing::debug!("Listing networks");

    let networks = state.runtime.list_networks().await?;
    Ok(Json(ApiResponse::ok(networks)))
}

/// GET /network/{name}
/// Resolve a network by name
pub async fn get_network(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ApiResponse<Network>>> {
    let id = state.runtime.network_id(&name).await?;
    Ok(Json(ApiResponse::ok(Network { name, id })))
}

/// POST /network
/// Create a bridge network
pub async fn create_network(
    State(state): State<AppState>,
    Json(input): Json<CreateNetworkInput>,
) -> ApiResult<Json<ApiResponse<Network>>> {
    if input.name.trim().is_empty() {
        return Err(ApiError::BadRequest("network name is required".to_string()));
    }

    tracing::info!("Creating network: {}", input.name);

    let id = state.runtime.create_network(&input.name).await?;
    Ok(Json(ApiResponse::ok(Network {
        name: input.name,
        id,
    })))
}

/// DELETE /network/{name}
/// Remove a network
pub async fn delete_network(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    tracing::info!("Removing network: {}", name);

    state.runtime.remove_network(&name).await?;
    Ok(Json(ApiResponse::empty()))
}
