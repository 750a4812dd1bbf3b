#![forbid(unsafe_code)]

use palika_server::{
    build_router, AppState, HttpSubmissionSource, LocalFsObjectStore, ServerConfig, UrlSigner,
    ATTACHMENT_URL_TTL,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("PALIKA_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env_string("PALIKA_BIND", "0.0.0.0:8080");
    let db_path = PathBuf::from(env_string("PALIKA_DB", "artifacts/registry.sqlite"));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("create db dir failed: {e}"))?;
    }
    let registry = palika_registry::open_registry(&db_path).map_err(|e| e.to_string())?;

    let config = ServerConfig {
        max_body_bytes: env_usize("PALIKA_MAX_BODY_BYTES", 256 * 1024),
        admin_role: env_string("PALIKA_ADMIN_ROLE", "admin"),
        attachment_url_ttl: Duration::from_secs(env_u64(
            "PALIKA_ATTACHMENT_URL_TTL_SECS",
            ATTACHMENT_URL_TTL.as_secs(),
        )),
        building_form_id: env_string("PALIKA_FORM_BUILDING", "building_survey"),
        business_form_id: env_string("PALIKA_FORM_BUSINESS", "business_survey"),
        family_form_id: env_string("PALIKA_FORM_FAMILY", "family_survey"),
    };
    let limits = palika_query::QueryLimits {
        max_limit: env_usize("PALIKA_MAX_PAGE_SIZE", 500),
        default_limit: env_usize("PALIKA_DEFAULT_PAGE_SIZE", 100),
    };

    let signing_secret = env::var("PALIKA_URL_SIGNING_SECRET")
        .map_err(|_| "PALIKA_URL_SIGNING_SECRET is required".to_string())?;
    let signer = UrlSigner::new(
        &env_string("PALIKA_STORE_PUBLIC_BASE_URL", "http://localhost:9000/survey"),
        signing_secret.as_bytes(),
        config.attachment_url_ttl,
    );
    let objects = Arc::new(LocalFsObjectStore::new(PathBuf::from(env_string(
        "PALIKA_OBJECT_ROOT",
        "artifacts/objects",
    ))));
    let submissions = Arc::new(HttpSubmissionSource::new(
        &env_string("PALIKA_SUBMISSION_BASE_URL", "http://localhost:9100"),
        env::var("PALIKA_SUBMISSION_BEARER").ok(),
    ));

    let state = AppState::new(registry, config, limits, signer, objects, submissions);
    let app = build_router(state);

    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .map_err(|e| format!("invalid bind addr {bind_addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    let listener: TcpListener = socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))?;
    info!("palika-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            let drain_ms = env_u64("PALIKA_SHUTDOWN_DRAIN_MS", 2000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
