//! # Protolab HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /api/prototypes` - List prototypes with tests and readiness
//! - `POST /api/prototypes` - Create a prototype
//! - `GET /api/prototypes/{id}` - Get one prototype with tests and readiness
//! - `PATCH /api/prototypes/{id}` - Edit a prototype
//! - `DELETE /api/prototypes/{id}` - Delete a prototype and its tests
//! - `POST /api/prototypes/{id}/advance` - Advance to the next status
//! - `POST /api/test-cases` - Create a test case
//! - `PATCH /api/test-cases/{id}` - Record a test result
//! - `DELETE /api/test-cases/{id}` - Delete a test case
//! - `GET /status` - Portfolio counts
//! - `GET /health` - Health check
//!
//! ## Security Configuration
//!
//! See [`SecurityConfig`]: CORS origins, global rate limit and optional
//! API key, from `PROTOLAB_*` environment variables or the config file.

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use (CLI JSON output, integration tests)
pub use auth::ApiKey;
pub use handlers::{ApiError, api_error};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    CreatePrototypeRequest, CreateTestCaseRequest, ErrorResponse, HealthResponse, PrototypeJson,
    PrototypeWithTestsJson, StatusCountsJson, StatusResponse, TestCaseJson,
    UpdatePrototypeRequest, UpdateTestResultRequest,
};

use crate::config::SecurityConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use protolab_core::{ProtolabError, Registry};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the registry.
#[derive(Clone)]
pub struct AppState {
    /// The registry; writes are serialized by the lock.
    pub registry: Arc<RwLock<Registry>>,
}

impl AppState {
    /// Create new app state with a registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer.
///
/// - `*`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ];
    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState, security: &SecurityConfig) -> Router {
    let cors = build_cors_layer(security.cors_origins.as_deref());

    let rate_limiter = if security.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            security.rate_limit
        );
        Some(create_rate_limiter(security.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let api_key = security.api_key.as_deref().map(ApiKey::new);
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set PROTOLAB_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/api/prototypes",
            get(handlers::list_prototypes_handler).post(handlers::create_prototype_handler),
        )
        .route(
            "/api/prototypes/{id}",
            get(handlers::get_prototype_handler)
                .patch(handlers::update_prototype_handler)
                .delete(handlers::delete_prototype_handler),
        )
        .route(
            "/api/prototypes/{id}/advance",
            post(handlers::advance_prototype_handler),
        )
        .route("/api/test-cases", post(handlers::create_test_case_handler))
        .route(
            "/api/test-cases/{id}",
            axum::routing::patch(handlers::update_test_case_handler)
                .delete(handlers::delete_test_case_handler),
        );

    // Authentication (innermost - runs last on request)
    if let Some(key) = api_key {
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(
    addr: &str,
    registry: Registry,
    security: &SecurityConfig,
) -> Result<(), ProtolabError> {
    let state = AppState::new(registry);
    let router = create_router(state, security);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ProtolabError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Protolab HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProtolabError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving; the process can still be killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn open_security() -> SecurityConfig {
        SecurityConfig {
            cors_origins: None,
            rate_limit: 0,
            api_key: None,
        }
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let router = create_router(AppState::new(Registry::new()), &open_security());
        let name = "x".repeat(MAX_BODY_BYTES);
        let body = format!(r#"{{"name":"{}"}}"#, name);

        let response = router
            .oneshot(
                Request::post("/api/prototypes")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn localhost_preflight_is_allowed() {
        let router = create_router(AppState::new(Registry::new()), &open_security());

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/prototypes")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }
}
