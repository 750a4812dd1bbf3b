use crate::http::handlers::{
    api_error_response, ok_json, propagated_request_id, query_error_response,
    registry_error_response, require_admin,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use palika_api::params::{parse_area_filters, parse_enumerator_filters};
use palika_api::{
    ApiError, AssignAreaEnumeratorBody, CreateAreaBody, CreateEnumeratorBody, CreateWardBody,
    UpdateEnumeratorBody, UpdateWardBody, WithdrawBody,
};
use palika_model::{AreaId, EnumeratorId, TokenCode};
use palika_registry::{EnumeratorUpdate, NewArea, NewEnumerator};
use serde_json::json;
use std::collections::BTreeMap;

pub(crate) async fn list_wards_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let conn = state.registry.lock().await;
    match palika_query::list_wards(&conn) {
        Ok(wards) => ok_json(wards),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn create_ward_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateWardBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let mut conn = state.registry.lock().await;
    match palika_registry::create_ward(&mut conn, body.ward_number, body.ward_area_code) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn update_ward_area_code_handler(
    State(state): State<AppState>,
    Path(ward_number): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateWardBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let mut conn = state.registry.lock().await;
    match palika_registry::update_ward_area_code(&mut conn, ward_number, body.ward_area_code) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn list_areas_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let (ward_number, status) = match parse_area_filters(&query) {
        Ok(filters) => filters,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let conn = state.registry.lock().await;
    match palika_query::list_areas(&conn, ward_number, status) {
        Ok(areas) => ok_json(areas),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn get_area_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let conn = state.registry.lock().await;
    match palika_query::get_area(&conn, &id) {
        Ok(detail) => ok_json(detail),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn create_area_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateAreaBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let id = match AreaId::parse(&body.id) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let mut tokens = Vec::with_capacity(body.tokens.len());
    for raw in &body.tokens {
        match TokenCode::parse(raw) {
            Ok(token) => tokens.push(token),
            Err(e) => {
                return api_error_response(
                    ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
                )
            }
        }
    }
    let area = NewArea {
        id,
        code: body.code.clone(),
        ward_number: body.ward_number,
        geometry: body.geometry.clone(),
        centroid: body.centroid.clone(),
        tokens,
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::create_area(&mut conn, &area) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn assign_area_enumerator_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AssignAreaEnumeratorBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let (area_id, enumerator_id) =
        match (AreaId::parse(&id), EnumeratorId::parse(&body.enumerator_id)) {
            (Ok(area), Ok(enumerator)) => (area, enumerator),
            (Err(e), _) | (_, Err(e)) => {
                return api_error_response(
                    ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
                )
            }
        };
    let mut conn = state.registry.lock().await;
    match palika_registry::assign_area_to_enumerator(&mut conn, &area_id, &enumerator_id) {
        Ok(()) => ok_json(json!({"status": "assigned"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn complete_area_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let area_id = match AreaId::parse(&id) {
        Ok(area) => area,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::complete_area(&mut conn, &area_id) {
        Ok(()) => ok_json(json!({"status": "pending"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn withdraw_area_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<WithdrawBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let area_id = match AreaId::parse(&id) {
        Ok(area) => area,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::withdraw_area(&mut conn, &area_id, &body.user_id) {
        Ok(()) => ok_json(json!({"status": "unassigned"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn list_enumerators_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let (ward_number, is_active) = match parse_enumerator_filters(&query) {
        Ok(filters) => filters,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let conn = state.registry.lock().await;
    match palika_query::list_enumerators(&conn, ward_number, is_active) {
        Ok(rows) => ok_json(rows),
        Err(e) => query_error_response(e, &request_id),
    }
}

pub(crate) async fn create_enumerator_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateEnumeratorBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let id = match EnumeratorId::parse(&body.id) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let enumerator = NewEnumerator {
        id,
        name: body.name.clone(),
        phone_number: body.phone_number.clone(),
        ward_number: body.ward_number,
        is_active: body.is_active,
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::create_enumerator(&mut conn, &enumerator) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}

pub(crate) async fn update_enumerator_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateEnumeratorBody>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(e) = require_admin(&state, &headers) {
        return api_error_response(e.with_request_id(request_id));
    }
    let id = match EnumeratorId::parse(&id) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_body(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    let update = EnumeratorUpdate {
        name: body.name.clone(),
        phone_number: body.phone_number.clone(),
        ward_number: body.ward_number,
        is_active: body.is_active,
    };
    let mut conn = state.registry.lock().await;
    match palika_registry::update_enumerator(&mut conn, &id, &update) {
        Ok(()) => ok_json(json!({"status": "ok"})),
        Err(e) => registry_error_response(e, &request_id),
    }
}
