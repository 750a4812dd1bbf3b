use crate::{
    build_router, AppState, FetchRequest, LocalFsObjectStore, ServerConfig, SubmissionError,
    SubmissionSource, UrlSigner,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use palika_model::{AreaId, EnumeratorId};
use palika_registry::{
    assign_area_to_enumerator, create_area, create_enumerator, create_ward, init_schema, NewArea,
    NewEnumerator,
};
use rusqlite::Connection;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct NoSubmissions;

#[async_trait]
impl SubmissionSource for NoSubmissions {
    async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<Value>, SubmissionError> {
        Err(SubmissionError("no submission source in tests".to_string()))
    }
}

fn area_id(raw: &str) -> AreaId {
    AreaId::parse(raw).expect("area id")
}

fn state_with_assigned_area() -> AppState {
    let mut conn = Connection::open_in_memory().expect("open memory db");
    init_schema(&conn).expect("schema");
    create_ward(&mut conn, 3, 977).expect("ward");
    create_area(
        &mut conn,
        &NewArea {
            id: area_id("a1"),
            code: "A1".to_string(),
            ward_number: 3,
            geometry: None,
            centroid: None,
            tokens: vec![],
        },
    )
    .expect("area");
    create_enumerator(
        &mut conn,
        &NewEnumerator {
            id: EnumeratorId::parse("e1").expect("id"),
            name: "Sita".to_string(),
            phone_number: None,
            ward_number: Some(3),
            is_active: true,
        },
    )
    .expect("enumerator");
    assign_area_to_enumerator(
        &mut conn,
        &area_id("a1"),
        &EnumeratorId::parse("e1").expect("id"),
    )
    .expect("assign");

    AppState::new(
        conn,
        ServerConfig::default(),
        palika_query::QueryLimits::default(),
        UrlSigner::new("http://store.local", b"test-secret", Duration::from_secs(60)),
        Arc::new(LocalFsObjectStore::new(
            std::env::temp_dir().join("palika-router-tests"),
        )),
        Arc::new(NoSubmissions),
    )
}

fn post(uri: &str, role: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(role) = role {
        builder = builder.header("x-role", role);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn complete_and_withdraw_reject_callers_without_a_role() {
    let app = build_router(state_with_assigned_area());
    for (uri, body) in [
        ("/v1/areas/a1/complete", ""),
        ("/v1/areas/a1/withdraw", r#"{"userId":"e1"}"#),
    ] {
        let response = app
            .clone()
            .oneshot(post(uri, None, body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn complete_and_withdraw_reject_non_admin_roles() {
    let app = build_router(state_with_assigned_area());
    for (uri, body) in [
        ("/v1/areas/a1/complete", ""),
        ("/v1/areas/a1/withdraw", r#"{"userId":"e1"}"#),
    ] {
        let response = app
            .clone()
            .oneshot(post(uri, Some("enumerator"), body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn rejected_lifecycle_calls_leave_area_status_untouched() {
    let state = state_with_assigned_area();
    let app = build_router(state.clone());
    let response = app
        .oneshot(post("/v1/areas/a1/withdraw", None, r#"{"userId":"e1"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let conn = state.registry.lock().await;
    let status: String = conn
        .query_row("SELECT status FROM area WHERE id = 'a1'", [], |row| {
            row.get(0)
        })
        .expect("area row");
    assert_eq!(status, "assigned");
}

#[tokio::test]
async fn admin_role_walks_the_area_lifecycle() {
    let app = build_router(state_with_assigned_area());
    let response = app
        .clone()
        .oneshot(post("/v1/areas/a1/complete", Some("admin"), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post(
            "/v1/areas/a1/withdraw",
            Some("admin"),
            r#"{"userId":"e1"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
