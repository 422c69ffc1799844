//! API Module
//!
//! HTTP API layer of the agent.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod host;
pub mod network;
pub mod service;
pub mod webhook;

use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post, put},
};
use deploybot_core::queue::EventQueue;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::repository::TaskRepository;
use crate::runtime::ContainerRuntime;
use crate::scheduler::TaskOrchestrator;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    /// Control plane task access
    pub tasks: Arc<dyn TaskRepository>,
    pub orchestrator: Arc<TaskOrchestrator>,
    pub runtime: Arc<dyn ContainerRuntime>,
    /// Receives one event per accepted webhook
    pub events: Arc<EventQueue>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/healthCheck", get(health::health_check))
        // Task intake
        .route("/streamWebhook", post(webhook::stream_webhook))
        // Host endpoints
        .route("/diskInfo", get(host::disk_info))
        .route("/images", delete(host::delete_images))
        .route("/builderCache", delete(host::delete_builder_cache))
        // Network endpoints
        .route("/networks", get(network::list_networks))
        .route("/network", post(network::create_network))
        .route("/network/{name}", get(network::get_network))
        .route("/network/{name}", delete(network::delete_network))
        // Service endpoints
        .route("/services", get(service::list_services))
        .route("/service", put(service::update_service))
        .route("/service/{name}", get(service::get_service))
        .route("/service/{name}", delete(service::delete_service))
        .route("/serviceLogs", get(service::service_logs))
        // Add state and middleware
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any origin may call the agent; preflights are cached for 12 hours
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(12 * 60 * 60))
}


#[cfg(test)]
mod tests {
    use super::testing;
    use super::*;
    use crate::repository::FakeTaskRepository;
    use crate::runtime::FakeRuntime;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let workspace = tempfile::tempdir().unwrap();
        let state = testing::state(
            &FakeTaskRepository::new(),
            &FakeRuntime::new(),
            workspace.path(),
        );

        let (status, body) = testing::send(state, Method::GET, "/healthCheck", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let workspace = tempfile::tempdir().unwrap();
        let state = testing::state(
            &FakeTaskRepository::new(),
            &FakeRuntime::new(),
            workspace.path(),
        );

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/streamWebhook")
                    .header(header::ORIGIN, "https://console.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_MAX_AGE)
                .and_then(|v| v.to_str().ok()),
            Some("43200")
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let workspace = tempfile::tempdir().unwrap();
        let state = testing::state(
            &FakeTaskRepository::new(),
            &FakeRuntime::new(),
            workspace.path(),
        );

        let (status, _) = testing::send(state, Method::GET, "/does/not/exist", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
