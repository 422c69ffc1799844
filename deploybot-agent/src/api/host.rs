//! Host API Handlers
//!
//! Disk usage and cleanup of images and build cache.

use axum::{
    Json,
    extract::{Query, State},
};
use deploybot_core::domain::host::DiskInfo;
use deploybot_core::dto::api::ApiResponse;
use serde::Deserialize;
use std::path::PathBuf;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::fsutil;

/// Query of GET /diskInfo
#[derive(Debug, Deserialize)]
pub struct DiskInfoQuery {
    pub path: Option<String>,
}

/// GET /diskInfo
/// Disk usage of the filesystem holding `path` (default `/`)
pub async fn disk_info(Query(query): Query<DiskInfoQuery>) -> ApiResult<Json<ApiResponse<DiskInfo>>> {
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"));

    tracing::debug!("Reading disk info of {}", path.display());

    let info = fsutil::disk_info(&path)?;
    Ok(Json(ApiResponse::ok(info)))
}

/// DELETE /images
/// Remove every local image
pub async fn delete_images(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<()>>> {
    tracing::info!("Removing all images");

    state.runtime.remove_images().await?;
    Ok(Json(ApiResponse::empty()))
}

/// DELETE /builderCache
/// Drop the image builder cache
pub async fn delete_builder_cache(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<()>>> {
    tracing::info!("Pruning builder cache");

    state.runtime.prune_builder_cache().await?;
    Ok(Json(ApiResponse::empty()))
}
