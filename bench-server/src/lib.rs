//! HTTP surface of the scanner-bait fixture server
//!
//! One axum router, one handler function per fixture route (the servlet
//! inheritance of the source corpus collapses to plain handlers). All
//! fixture responses are `text/html;charset=UTF-8`.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use bench_core::config::BenchConfig;
use bench_core::db::SqlHelper;
use bench_core::error::BenchError;
use bench_core::session::SessionStore;
use bench_core::sink::LogSink;

pub mod logging;
pub mod routes;

/// Shared state behind every handler. Per-request state (keys, IVs, buffers)
/// never lives here; only the append-only sink, the session store, and the
/// seeded fixture database are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BenchConfig>,
    pub sessions: Arc<SessionStore>,
    pub sink: LogSink,
    pub sql: SqlHelper,
}

impl AppState {
    /// Build state from configuration: open the sink directory lazily, seed
    /// the in-memory fixture database eagerly.
    pub async fn from_config(config: BenchConfig) -> Result<Self, BenchError> {
        let sink = LogSink::new(config.testfiles_dir.clone());
        let sql = SqlHelper::connect(config.hide_sql_errors).await?;
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            sink,
            sql,
        })
    }
}

/// Assemble the fixture router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // --- Index & health ---
        .route("/", get(routes::index_handler))
        .route("/health", get(routes::health_handler))
        // --- Weak cryptography fixtures ---
        .route(
            "/crypto/cookie",
            get(routes::cookie_crypto_get).post(routes::cookie_crypto_post),
        )
        .route(
            "/crypto/param",
            get(routes::param_crypto_handler).post(routes::param_crypto_handler),
        )
        .route(
            "/crypto/stream",
            get(routes::stream_crypto_handler).post(routes::stream_crypto_handler),
        )
        // --- Weak randomness fixtures ---
        .route(
            "/weakrand/remember-me/:id",
            get(routes::remember_me_handler).post(routes::remember_me_handler),
        )
        // --- SQL injection fixture ---
        .route(
            "/sqli/user-lookup",
            get(routes::user_lookup_handler).post(routes::user_lookup_handler),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
