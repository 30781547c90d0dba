//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every handler returns either `(StatusCode, Json<T>)` or an `ApiError`;
//! core errors are turned into HTTP responses by `api_error` alone.

use super::{
    AppState,
    types::{
        CreatePrototypeRequest, CreateTestCaseRequest, ErrorResponse, HealthResponse,
        PrototypeJson, PrototypeWithTestsJson, StatusResponse, TestCaseJson,
        UpdatePrototypeRequest, UpdateTestResultRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use protolab_core::{ProtolabError, PrototypeId, TestCaseId};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

/// Map a core error to its HTTP status and body.
pub fn api_error(err: ProtolabError) -> ApiError {
    let status = match &err {
        ProtolabError::Validation(_)
        | ProtolabError::InvalidTransition(_)
        | ProtolabError::GateRejected(_) => StatusCode::BAD_REQUEST,
        ProtolabError::PrototypeNotFound(_) | ProtolabError::TestCaseNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ProtolabError::IoError(_)
        | ProtolabError::SerializationError(_)
        | ProtolabError::DeserializationError(_) => {
            tracing::error!(event = "storage_failure", error = %err, "Storage operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::from_error(&err)))
}

/// Malformed or mistyped JSON bodies are client errors. Oversized bodies
/// keep their 413.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorResponse::new(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    )
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get portfolio status.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let registry = state.registry.read().await;
    let metrics = registry.metrics().map_err(api_error)?;
    Ok((StatusCode::OK, Json(StatusResponse::from(&metrics))))
}

// =============================================================================
// PROTOTYPE HANDLERS
// =============================================================================

/// List every prototype with its tests and readiness.
pub async fn list_prototypes_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<PrototypeWithTestsJson>> {
    let registry = state.registry.read().await;
    let views = registry.list().map_err(api_error)?;
    let body = views.iter().map(PrototypeWithTestsJson::from).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// Get one prototype with its tests and readiness.
pub async fn get_prototype_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PrototypeWithTestsJson> {
    let registry = state.registry.read().await;
    let view = registry.get(&PrototypeId::new(id)).map_err(api_error)?;
    Ok((StatusCode::OK, Json(PrototypeWithTestsJson::from(&view))))
}

/// Create a prototype in status DESIGN.
pub async fn create_prototype_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePrototypeRequest>, JsonRejection>,
) -> ApiResult<PrototypeJson> {
    let Json(request) = payload.map_err(json_rejection)?;
    let input = request.validate().map_err(api_error)?;

    let mut registry = state.registry.write().await;
    let prototype = registry.create(input).map_err(api_error)?;
    tracing::info!(
        event = "prototype_created",
        prototype_id = %prototype.id,
        "Prototype created"
    );
    Ok((StatusCode::CREATED, Json(PrototypeJson::from(&prototype))))
}

/// Edit name, area, owner or target date.
pub async fn update_prototype_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePrototypeRequest>, JsonRejection>,
) -> ApiResult<PrototypeJson> {
    let Json(request) = payload.map_err(json_rejection)?;
    let patch = request.validate().map_err(api_error)?;

    let mut registry = state.registry.write().await;
    let prototype = registry
        .edit(&PrototypeId::new(id), &patch)
        .map_err(api_error)?;
    Ok((StatusCode::OK, Json(PrototypeJson::from(&prototype))))
}

/// Move a prototype one lifecycle step forward.
pub async fn advance_prototype_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PrototypeJson> {
    let id = PrototypeId::new(id);
    let mut registry = state.registry.write().await;

    match registry.advance(&id) {
        Ok(prototype) => {
            tracing::info!(
                event = "status_advanced",
                prototype_id = %id,
                status = %prototype.status,
                "Prototype advanced"
            );
            Ok((StatusCode::OK, Json(PrototypeJson::from(&prototype))))
        }
        Err(ProtolabError::GateRejected(decision)) => {
            let reasons: Vec<&str> = decision.reasons.iter().map(|r| r.as_str()).collect();
            tracing::info!(
                event = "gate_rejected",
                prototype_id = %id,
                reasons = ?reasons,
                "Release gate blocked advance to READY"
            );
            Err(api_error(ProtolabError::GateRejected(decision)))
        }
        Err(e) => Err(api_error(e)),
    }
}

/// Delete a prototype and its tests. Deleting an unknown id is not an error.
pub async fn delete_prototype_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut registry = state.registry.write().await;
    registry
        .delete(&PrototypeId::new(id))
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// TEST CASE HANDLERS
// =============================================================================

/// Attach a test case (result NOT_RUN) to an existing prototype.
pub async fn create_test_case_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateTestCaseRequest>, JsonRejection>,
) -> ApiResult<TestCaseJson> {
    let Json(request) = payload.map_err(json_rejection)?;
    let input = request.validate().map_err(api_error)?;

    let mut registry = state.registry.write().await;
    let test = registry.create_test_case(input).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(TestCaseJson::from(&test))))
}

/// Record a test result.
pub async fn update_test_case_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTestResultRequest>, JsonRejection>,
) -> ApiResult<TestCaseJson> {
    let Json(request) = payload.map_err(json_rejection)?;
    let result = request.validate().map_err(api_error)?;

    let mut registry = state.registry.write().await;
    let test = registry
        .update_test_result(&TestCaseId::new(id), result)
        .map_err(api_error)?;
    Ok((StatusCode::OK, Json(TestCaseJson::from(&test))))
}

/// Delete a test case. Deleting an unknown id is not an error.
pub async fn delete_test_case_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut registry = state.registry.write().await;
    registry
        .delete_test_case(&TestCaseId::new(id))
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
