#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use palika_query::QueryLimits;
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use tokio::sync::Mutex;

mod config;
mod http;
#[cfg(test)]
mod router_tests;
mod storage;
mod submissions;

pub use config::ServerConfig;
pub use storage::{
    avatar_key, id_card_photo_key, is_valid_object_key, parse_image_data_uri, LocalFsObjectStore,
    ObjectStore, StorageError, UrlSigner, ATTACHMENT_URL_TTL,
};
pub use submissions::{
    apply_submissions, FetchRequest, HttpSubmissionSource, IngestReport, SubmissionError,
    SubmissionSource,
};

pub const CRATE_NAME: &str = "palika-server";

/// Shared per-request state. The registry connection sits behind an async
/// mutex; every mutation is a single transaction executed while the lock is
/// held, which is the whole concurrency story of this service.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<Connection>>,
    pub config: ServerConfig,
    pub limits: QueryLimits,
    pub signer: Arc<UrlSigner>,
    pub objects: Arc<dyn ObjectStore>,
    pub submissions: Arc<dyn SubmissionSource>,
    pub ready: Arc<AtomicBool>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(
        registry: Connection,
        config: ServerConfig,
        limits: QueryLimits,
        signer: UrlSigner,
        objects: Arc<dyn ObjectStore>,
        submissions: Arc<dyn SubmissionSource>,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            config,
            limits,
            signer: Arc::new(signer),
            objects,
            submissions,
            ready: Arc::new(AtomicBool::new(true)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route(
            "/v1/wards",
            get(http::admin::list_wards_handler).post(http::admin::create_ward_handler),
        )
        .route(
            "/v1/wards/{wardNumber}/area-code",
            put(http::admin::update_ward_area_code_handler),
        )
        .route(
            "/v1/areas",
            get(http::admin::list_areas_handler).post(http::admin::create_area_handler),
        )
        .route("/v1/areas/{id}", get(http::admin::get_area_handler))
        .route(
            "/v1/areas/{id}/assign",
            post(http::admin::assign_area_enumerator_handler),
        )
        .route(
            "/v1/areas/{id}/complete",
            post(http::admin::complete_area_handler),
        )
        .route(
            "/v1/areas/{id}/withdraw",
            post(http::admin::withdraw_area_handler),
        )
        .route(
            "/v1/enumerators",
            get(http::admin::list_enumerators_handler)
                .post(http::admin::create_enumerator_handler),
        )
        .route(
            "/v1/enumerators/{id}",
            patch(http::admin::update_enumerator_handler),
        )
        .route(
            "/v1/attachments/url",
            post(http::attachments::attachment_url_handler),
        )
        .route(
            "/v1/attachments/id-card-photo",
            post(http::attachments::upload_id_card_photo_handler),
        )
        .route(
            "/v1/attachments/avatar",
            post(http::attachments::upload_avatar_handler),
        )
        .route(
            "/v1/submissions/fetch",
            post(http::entities::fetch_submissions_handler),
        )
        .route("/v1/{collection}", get(http::entities::list_handler))
        .route(
            "/v1/{collection}/stats",
            get(http::entities::stats_handler),
        )
        .route(
            "/v1/{collection}/{id}",
            get(http::entities::get_handler).delete(http::entities::delete_handler),
        )
        .route(
            "/v1/{collection}/{id}/area",
            post(http::entities::assign_area_handler),
        )
        .route(
            "/v1/{collection}/{id}/ward",
            post(http::entities::assign_ward_handler),
        )
        .route(
            "/v1/{collection}/{id}/enumerator",
            post(http::entities::assign_enumerator_handler),
        )
        .route(
            "/v1/{collection}/{id}/review",
            post(http::entities::review_handler),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
