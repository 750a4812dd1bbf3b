use palika_api::{ApiError, ApiErrorCode};
use palika_query::{QueryError, QueryErrorCode};
use palika_registry::{ErrorCode, RegistryError};
use serde_json::json;

#[test]
fn registry_errors_map_onto_wire_codes() {
    let err: ApiError = RegistryError::not_found("area", "a9").into();
    assert_eq!(err.code, ApiErrorCode::NotFound);
    assert!(err.message.contains("a9"));

    let err: ApiError = RegistryError::new(ErrorCode::BadRequest, "token taken").into();
    assert_eq!(err.code, ApiErrorCode::BadRequest);
    assert_eq!(err.message, "token taken");
}

#[test]
fn internal_causes_never_reach_the_wire_verbatim() {
    let err: ApiError =
        RegistryError::new(ErrorCode::Internal, "disk I/O error at page 42").into();
    assert_eq!(err.code, ApiErrorCode::Internal);
    assert_eq!(err.message, "internal error");

    let err: ApiError =
        QueryError::new(QueryErrorCode::Internal, "no such column: wardNumbe").into();
    assert_eq!(err.message, "internal error");
}

#[test]
fn query_errors_map_onto_wire_codes() {
    let err: ApiError = QueryError::new(QueryErrorCode::NotFound, "family not found: f9").into();
    assert_eq!(err.code, ApiErrorCode::NotFound);
    let err: ApiError =
        QueryError::new(QueryErrorCode::BadRequest, "limit must be between 1 and 500").into();
    assert_eq!(err.code, ApiErrorCode::BadRequest);
}

#[test]
fn error_codes_serialize_screaming_snake() {
    let err = ApiError::new(
        ApiErrorCode::Unauthorized,
        "admin role required",
        serde_json::Value::Null,
        "req-0000000000000001",
    );
    let wire = serde_json::to_value(&err).expect("serialize");
    assert_eq!(
        wire,
        json!({
            "code": "UNAUTHORIZED",
            "message": "admin role required",
            "details": null,
            "request_id": "req-0000000000000001",
        })
    );
}

#[test]
fn http_status_mapping() {
    assert_eq!(ApiErrorCode::NotFound.http_status(), 404);
    assert_eq!(ApiErrorCode::BadRequest.http_status(), 400);
    assert_eq!(ApiErrorCode::Unauthorized.http_status(), 403);
    assert_eq!(ApiErrorCode::Internal.http_status(), 500);
}
