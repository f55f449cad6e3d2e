//! breedlog-api library - livestock breed record HTTP service
//!
//! Handlers receive every external collaborator (pool, object store,
//! classifier, token verifier) through `AppState`, so tests can swap in
//! in-memory versions.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod error;
pub mod gateway;
pub mod image_fetch;
pub mod pagination;
pub mod storage;

use auth::JwtVerifier;
use classifier::BreedClassifier;
use storage::ObjectStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Image object store
    pub store: Arc<dyn ObjectStore>,
    /// Client for downloading non-storage image URLs
    pub http: reqwest::Client,
    pub classifier: Arc<dyn BreedClassifier>,
    pub auth: Arc<JwtVerifier>,
    /// Upload size limit in bytes
    pub max_upload_bytes: usize,
    /// Service start time (for uptime)
    pub startup_time: DateTime<Utc>,
    /// Most recent secondary-write failure, reported by `/health`
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        store: Arc<dyn ObjectStore>,
        classifier: Arc<dyn BreedClassifier>,
        auth: Arc<JwtVerifier>,
    ) -> Self {
        Self {
            db,
            store,
            http: reqwest::Client::new(),
            classifier,
            auth,
            max_upload_bytes: config::DEFAULT_MAX_UPLOAD_BYTES,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Remember a failure for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
///
/// CORS is permissive on every route, so preflight requests are answered
/// before reaching a handler.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/classify", post(api::classify))
        .route(
            "/api/records",
            get(api::list_records).patch(api::update_record),
        )
        .route("/api/records/summary", get(api::records_summary))
        .route("/api/records/:id", get(api::get_record))
        .route("/api/breeds", get(api::list_breeds))
        .route(
            "/api/profile",
            get(api::get_profile).patch(api::update_profile),
        )
        .route("/api/images", post(api::upload_image))
        .route("/api/storage/:bucket/*key", get(api::get_object))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
