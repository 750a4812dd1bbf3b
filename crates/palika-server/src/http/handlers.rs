use crate::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use palika_api::{ApiError, ApiErrorCode};
use palika_model::EntityKind;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tracing::error;

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

pub(crate) fn ok_json<T: Serialize>(payload: T) -> Response {
    Json(payload).into_response()
}

pub(crate) fn registry_error_response(
    err: palika_registry::RegistryError,
    request_id: &str,
) -> Response {
    if err.code == palika_registry::ErrorCode::Internal {
        error!(request_id, "registry failure: {err}");
    }
    api_error_response(ApiError::from(err).with_request_id(request_id))
}

pub(crate) fn query_error_response(err: palika_query::QueryError, request_id: &str) -> Response {
    if err.code == palika_query::QueryErrorCode::Internal {
        error!(request_id, "query failure: {err}");
    }
    api_error_response(ApiError::from(err).with_request_id(request_id))
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

/// The upstream proxy authenticates callers and forwards their role; this
/// service only reads the header it is handed.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let role = headers
        .get("x-role")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if role == state.config.admin_role {
        Ok(())
    } else {
        Err(ApiError::unauthorized("admin role required"))
    }
}

pub(crate) fn parse_collection(raw: &str) -> Result<EntityKind, ApiError> {
    match raw {
        "buildings" => Ok(EntityKind::Building),
        "businesses" => Ok(EntityKind::Business),
        "families" => Ok(EntityKind::Family),
        _ => Err(ApiError::new(
            ApiErrorCode::NotFound,
            format!("unknown collection: {raw}"),
            Value::Null,
            "req-unknown",
        )),
    }
}

pub(crate) async fn healthz_handler() -> Response {
    ok_json(json!({"status": "ok"}))
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    if state.ready.load(Ordering::Relaxed) {
        ok_json(json!({"ready": true}))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"ready": false}))).into_response()
    }
}

pub(crate) async fn version_handler() -> Response {
    ok_json(json!({
        "name": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
