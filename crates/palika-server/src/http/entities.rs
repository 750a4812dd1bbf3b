use crate::http::handlers::{
    api_error_response, ok_json, parse_collection, propagated_request_id, query_error_response,
    registry_error_response, require_admin,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use palika_api::params::parse_list_params;
use palika_api::{
    ApiError, AssignAreaBody, AssignEnumeratorBody, AssignWardBody, FetchSubmissionsBody,
    ReviewBody,
};
use palika_model::{AreaId, EntityId, EntityKind, EnumeratorId, ReviewAction, TokenCode};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info};

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let kind = match parse_collection(&collection) {
        Ok(kind) => kind,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let req = match parse_list_params(&query, &state.limits) {
        Ok(req) => req,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let conn = state.registry.lock().await;
    match palika_query::list_entities(&conn, kind, &req, &state.limits) {
        Ok(page) => ok_json(page),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let kind = match parse_collection(&collection) {
        Ok(kind) => kind,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let conn = state.registry.lock().await;
    match palika_query::get_entity(&conn, kind, &id) {
        Ok(row) => ok_json(row),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let kind = match parse_collection(&collection) {
        Ok(kind) => kind,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let conn = state.registry.lock().await;
    match palika_query::get_stats(&conn, kind) {
        Ok(stats) => ok_json(stats),
        Err(e) => query_error_response(e, &request_id),
    }
}

fn parse_entity_path(
    collection: &str,
    id: &str,
) -> Result<(EntityKind, EntityId), ApiError> {
    let kind = parse_collection(collection)?;
    let id = EntityId::parse(id).map_err(|e| ApiError::invalid_body(&e.to_string()))?;
    Ok((kind, id))
}

pub(crate) async fn assign_area_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<AssignAreaBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (kind, entity_id) = match parse_entity_path(&collection, &id) {
        Ok(parsed) => parsed,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let area_id = match body.area_id.as_deref().map(AreaId::parse).transpose() {
        Ok(area) => area,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let token = match body.token.as_deref().map(TokenCode::parse).transpose() {
        Ok(token) => token,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    if area_id.is_none() && token.is_some() {
        return api_error_response(
            ApiError::invalid_body("a token cannot be assigned without an area")
                .with_request_id(request_id),
        );
    }
    let mut conn = state.registry.lock().await;
    match palika_registry::assign_area(
        &mut conn,
        kind,
        &entity_id,
        area_id.as_ref(),
        token.as_ref(),
    ) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn assign_ward_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<AssignWardBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (kind, entity_id) = match parse_entity_path(&collection, &id) {
        Ok(parsed) => parsed,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::assign_ward(&mut conn, kind, &entity_id, body.ward_number) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn assign_enumerator_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<AssignEnumeratorBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (kind, entity_id) = match parse_entity_path(&collection, &id) {
        Ok(parsed) => parsed,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let enumerator_id = match EnumeratorId::parse(&body.enumerator_id) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::assign_enumerator(&mut conn, kind, &entity_id, &enumerator_id) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn review_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<ReviewBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (kind, entity_id) = match parse_entity_path(&collection, &id) {
        Ok(parsed) => parsed,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let action = match ReviewAction::parse(&body.action) {
        Ok(action) => action,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::review_entity(&mut conn, kind, &entity_id, action) {
        Ok(next) => ok_json(json!({"status": next.as_str()})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn delete_handler(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (kind, entity_id) = match parse_entity_path(&collection, &id) {
        Ok(parsed) => parsed,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::delete_entity(&mut conn, kind, &entity_id) {
        Ok(()) => ok_json(json!({"status": "deleted"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

fn kind_for_form(state: &AppState, form_id: &str) -> Option<EntityKind> {
    if form_id == state.config.building_form_id {
        Some(EntityKind::Building)
    } else if form_id == state.config.business_form_id {
        Some(EntityKind::Business)
    } else if form_id == state.config.family_form_id {
        Some(EntityKind::Family)
    } else {
        None
    }
}

/// Trigger a pull from the external survey-collection backend and ingest
/// whatever it returns. The fetch protocol itself belongs to that backend;
/// this endpoint only reports how the ingestion went. No retry on failure.
pub(crate) async fn fetch_submissions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FetchSubmissionsBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    if body.form_id.trim().is_empty() {
        return api_error_response(
            ApiError::invalid_body("formId must not be empty").with_request_id(request_id),
        );
    }
    let Some(kind) = kind_for_form(&state, &body.form_id) else {
        return api_error_response(
            ApiError::invalid_body(&format!("unknown form: {}", body.form_id))
                .with_request_id(request_id),
        );
    };

    let request = crate::FetchRequest {
        form_id: body.form_id.clone(),
        start_date: body.start_date.clone(),
        end_date: body.end_date.clone(),
        count: body.count,
    };
    let rows = match state.submissions.fetch(&request).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(%request_id, form = %body.form_id, "submission fetch failed: {e}");
            return api_error_response(ApiError::internal().with_request_id(request_id));
        }
    };

    let conn = state.registry.lock().await;
    let report = crate::apply_submissions(&conn, kind, &rows);
    info!(
        %request_id,
        form = %body.form_id,
        fetched = report.fetched,
        inserted = report.inserted,
        failed = report.failed,
        "submission ingest finished"
    );
    ok_json(report)
}
