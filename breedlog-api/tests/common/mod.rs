//! Shared helpers for breedlog-api integration tests
//!
//! Each test builds its own app over a fresh in-memory database and
//! in-memory object store, with the fixed-output classifier.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use breedlog_api::auth::JwtVerifier;
use breedlog_api::classifier::MockClassifier;
use breedlog_api::storage::{MemoryObjectStore, ObjectPath, ObjectStore};
use breedlog_api::{build_router, AppState};
use breedlog_common::db::init_memory_database;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

/// Minimal JPEG header; enough for content sniffing
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];

/// PNG signature plus an IHDR length/tag
pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_state(|state| state).await
    }

    /// Build with a tweak applied to the default state
    pub async fn with_state(tweak: impl FnOnce(AppState) -> AppState) -> Self {
        let db = init_memory_database().await.expect("in-memory database");
        let store = Arc::new(MemoryObjectStore::new());
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("http client");

        let state = AppState::new(
            db,
            store.clone(),
            Arc::new(MockClassifier::new()),
            Arc::new(JwtVerifier::new(SECRET, None)),
        )
        .with_http_client(http);
        let state = tweak(state);

        Self {
            router: build_router(state.clone()),
            state,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::util::ServiceExt;
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Store a photo under the user's private prefix; returns its reference
    pub async fn put_photo(&self, owner: Uuid) -> String {
        let path = ObjectPath::new_upload(owner, "jpg");
        self.store.put(&path, JPEG.to_vec()).await.unwrap();
        path.to_string()
    }

    /// Classify through the API; panics unless it succeeds
    pub async fn classify(&self, user: Uuid, animal_id: &str, species: &str) -> Value {
        let image_url = self.put_photo(user).await;
        let response = self
            .send(json_request(
                "POST",
                "/api/classify",
                Some(&token_for(user)),
                json!({
                    "image_url": image_url,
                    "animal_id": animal_id,
                    "user_id": user.to_string(),
                    "species": species,
                }),
            ))
            .await;
        assert_eq!(response.status(), 200, "classify should succeed");
        body_json(response).await
    }
}

/// HS256 token for `user`, valid for an hour
pub fn token_for(user: Uuid) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "sub": user.to_string(),
            "exp": chrono::Utc::now().timestamp() + 3600,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token encodes")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("JSON body")
}
