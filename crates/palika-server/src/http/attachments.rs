use crate::http::handlers::{api_error_response, ok_json, propagated_request_id};
use crate::storage::{
    avatar_key, id_card_photo_key, is_valid_object_key, parse_image_data_uri, unix_now_secs,
};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use palika_api::{ApiError, AttachmentUrlBody, UploadAvatarBody, UploadIdCardPhotoBody};
use serde_json::json;
use tracing::error;

/// Time-limited retrieval URL for a stored object. The object store itself
/// is external; only the key scheme and the signature are ours.
pub(crate) async fn attachment_url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AttachmentUrlBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if !is_valid_object_key(body.key.trim()) {
        return api_error_response(
            ApiError::invalid_body("malformed object key").with_request_id(request_id),
        );
    }
    let now = unix_now_secs();
    match state.signer.presigned_url(body.key.trim(), now) {
        Ok(url) => ok_json(json!({
            "url": url,
            "expiresAt": now + state.signer.ttl_secs(),
        })),
        Err(e) => {
            error!(%request_id, "presigned url failure: {e}");
            api_error_response(ApiError::internal().with_request_id(request_id))
        }
    }
}

async fn store_data_uri(
    state: &AppState,
    request_id: &str,
    owner_id: &str,
    data_uri: &str,
    key_for: fn(&str, &str) -> String,
) -> Response {
    let owner = owner_id.trim();
    if owner.is_empty()
        || !owner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return api_error_response(
            ApiError::invalid_body("owner id must contain only [A-Za-z0-9_-]")
                .with_request_id(request_id),
        );
    }
    let (ext, bytes) = match parse_image_data_uri(data_uri) {
        Ok(parsed) => parsed,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let key = key_for(owner, &ext);
    if let Err(e) = state.objects.put_object(&key, &bytes) {
        error!(request_id, %key, "object store write failed: {e}");
        return api_error_response(ApiError::internal().with_request_id(request_id));
    }
    let now = unix_now_secs();
    match state.signer.presigned_url(&key, now) {
        Ok(url) => ok_json(json!({"key": key, "url": url})),
        Err(e) => {
            error!(request_id, %key, "presigned url failure: {e}");
            api_error_response(ApiError::internal().with_request_id(request_id))
        }
    }
}

pub(crate) async fn upload_id_card_photo_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UploadIdCardPhotoBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    store_data_uri(
        &state,
        &request_id,
        &body.entity_id,
        &body.data_uri,
        id_card_photo_key,
    )
    .await
}

pub(crate) async fn upload_avatar_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UploadAvatarBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    store_data_uri(&state, &request_id, &body.user_id, &body.data_uri, avatar_key).await
}
