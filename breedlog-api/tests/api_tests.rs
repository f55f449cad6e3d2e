//! Integration tests for breedlog-api endpoints
//!
//! Every test drives the full router with `oneshot` over an in-memory
//! database, an in-memory object store and the fixed-output classifier.

mod common;

use axum::{
    http::{header, Request, StatusCode},
    routing::get as get_route,
    Router,
};
use axum::body::Body;
use breedlog_api::classifier::{BreedClassifier, ClassifierError};
use breedlog_common::{BreedPrediction, Species};
use common::{body_json, get, json_request, token_for, TestApp, JPEG};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// Health and CORS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = TestApp::new().await;

    let response = app.send(get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "breedlog-api");
    assert!(body["version"].is_string());
    assert!(body["build"]["git_hash"].is_string());
    assert!(body["uptime_seconds"].is_number());
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_cors_preflight_answered_without_auth() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/records")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

// =============================================================================
// Breed catalog
// =============================================================================

#[tokio::test]
async fn test_breeds_filtered_by_species_sorted_by_name() {
    let app = TestApp::new().await;

    let body = body_json(app.send(get("/api/breeds?species=buffalo", None)).await).await;
    let breeds = body["breeds"].as_array().unwrap();

    assert!(!breeds.is_empty());
    assert_eq!(body["total"], breeds.len());
    assert!(breeds.iter().all(|b| b["species"] == "buffalo"));

    let names: Vec<&str> = breeds.iter().map(|b| b["name"].as_str().unwrap()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn test_breeds_unknown_species_lists_everything() {
    let app = TestApp::new().await;

    let all = body_json(app.send(get("/api/breeds", None)).await).await;
    let unknown = body_json(app.send(get("/api/breeds?species=yak", None)).await).await;

    assert_eq!(all["total"], unknown["total"]);
    let species: Vec<&str> = all["breeds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["species"].as_str().unwrap())
        .collect();
    assert!(species.contains(&"cattle"));
    assert!(species.contains(&"buffalo"));
}

// =============================================================================
// Classification
// =============================================================================

#[tokio::test]
async fn test_classify_creates_record_with_top_prediction() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let result = app.classify(user, "TAG-001", "cattle").await;

    assert_eq!(result["success"], true);
    assert_eq!(result["created"], true);
    assert_eq!(result["top_prediction"]["breed"], "gir");
    assert_eq!(result["top_prediction"]["confidence"], 0.85);
    assert_eq!(result["model_version"], "mock-v1");
    assert!(result["processing_time_ms"].is_number());
    assert!(result["advice"].as_str().unwrap().starts_with("Confidence high"));
    assert!(result["breed_info"]["advantages"].is_array());

    let confidences: Vec<f64> = result["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["confidence"].as_f64().unwrap())
        .collect();
    assert!(confidences.windows(2).all(|w| w[0] >= w[1]));

    let record_id = result["record_id"].as_str().unwrap();
    let token = token_for(user);
    let body = body_json(
        app.send(get(&format!("/api/records/{}", record_id), Some(&token)))
            .await,
    )
    .await;
    let record = &body["record"];
    assert_eq!(record["predicted_breed"], "gir");
    assert_eq!(record["final_breed"], "gir");
    assert_eq!(record["confidence_score"], 0.85);
    assert_eq!(record["verification_status"], "pending");
    assert_eq!(record["prediction_logs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_classify_buffalo_uses_buffalo_breeds() {
    let app = TestApp::new().await;
    let result = app.classify(Uuid::new_v4(), "BUF-9", "buffalo").await;
    assert_eq!(result["top_prediction"]["breed"], "murrah");
}

#[tokio::test]
async fn test_repeat_classification_upserts_one_record_two_logs() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let first = app.classify(user, "TAG-001", "cattle").await;
    let second = app.classify(user, "TAG-001", "cattle").await;

    assert_eq!(first["record_id"], second["record_id"]);
    assert_eq!(first["created"], true);
    assert_eq!(second["created"], false);

    let body = body_json(app.send(get("/api/records", Some(&token_for(user)))).await).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(
        body["records"][0]["prediction_logs"].as_array().unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_classify_validation_errors() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);
    let image_url = app.put_photo(user).await;

    let cases = [
        json!({"animal_id": "A", "user_id": user.to_string(), "species": "cattle"}),
        json!({"image_url": image_url, "user_id": user.to_string(), "species": "cattle"}),
        json!({"image_url": image_url, "animal_id": " ", "user_id": user.to_string(), "species": "cattle"}),
        json!({"image_url": image_url, "animal_id": "A", "species": "cattle"}),
        json!({"image_url": image_url, "animal_id": "A", "user_id": user.to_string()}),
        json!({"image_url": image_url, "animal_id": "A", "user_id": user.to_string(), "species": "goat"}),
    ];
    for body in cases {
        let response = app
            .send(json_request("POST", "/api/classify", Some(&token), body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error = body_json(response).await;
        assert_eq!(error["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_classify_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(Uuid::new_v4())))
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classify_requires_matching_bearer() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let image_url = app.put_photo(user).await;
    let body = json!({
        "image_url": image_url,
        "animal_id": "TAG-1",
        "user_id": user.to_string(),
        "species": "cattle",
    });

    let anonymous = app
        .send(json_request("POST", "/api/classify", None, body.clone()))
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let impostor = token_for(Uuid::new_v4());
    let mismatched = app
        .send(json_request("POST", "/api/classify", Some(&impostor), body.clone()))
        .await;
    assert_eq!(mismatched.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .send(json_request("POST", "/api/classify", Some("not-a-jwt"), body))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_classify_missing_image_is_upstream_error_without_record() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);

    let response = app
        .send(json_request(
            "POST",
            "/api/classify",
            Some(&token),
            json!({
                "image_url": format!("animal-images/{}/missing.jpg", user),
                "animal_id": "TAG-1",
                "user_id": user.to_string(),
                "species": "cattle",
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "UPSTREAM_ERROR");
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("missing.jpg"));

    let listing = body_json(app.send(get("/api/records", Some(&token))).await).await;
    assert_eq!(listing["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_classify_cannot_read_another_users_photo() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let image_url = app.put_photo(owner).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/classify",
            Some(&token_for(intruder)),
            json!({
                "image_url": image_url,
                "animal_id": "TAG-1",
                "user_id": intruder.to_string(),
                "species": "cattle",
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_classify_downloads_non_storage_urls() {
    let images = Router::new()
        .route("/cow.jpg", get_route(|| async { JPEG.to_vec() }))
        .route("/empty.jpg", get_route(|| async { Vec::<u8>::new() }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, images).await.unwrap();
    });

    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);
    let request = |path: &str, animal: &str| {
        json_request(
            "POST",
            "/api/classify",
            Some(&token),
            json!({
                "image_url": format!("http://{}{}", addr, path),
                "animal_id": animal,
                "user_id": user.to_string(),
                "species": "cattle",
            }),
        )
    };

    let ok = app.send(request("/cow.jpg", "NET-1")).await;
    assert_eq!(ok.status(), StatusCode::OK);

    let empty = app.send(request("/empty.jpg", "NET-2")).await;
    assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let missing = app.send(request("/nope.jpg", "NET-3")).await;
    assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(missing).await;
    assert!(error["error"]["message"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_prediction_log_failure_does_not_fail_classification() {
    let app = TestApp::new().await;
    sqlx::query("DROP TABLE prediction_logs")
        .execute(&app.state.db)
        .await
        .unwrap();

    let result = app.classify(Uuid::new_v4(), "TAG-1", "cattle").await;
    assert_eq!(result["success"], true);
    assert_eq!(result["top_prediction"]["breed"], "gir");

    let health = body_json(app.send(get("/health", None)).await).await;
    assert!(health["last_error"]
        .as_str()
        .unwrap()
        .contains("Prediction log write failed"));
}

#[tokio::test]
async fn test_record_write_failure_fails_classification_without_log() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let image_url = app.put_photo(user).await;
    sqlx::query("DROP TABLE animal_records")
        .execute(&app.state.db)
        .await
        .unwrap();

    let response = app
        .send(json_request(
            "POST",
            "/api/classify",
            Some(&token_for(user)),
            json!({
                "image_url": image_url,
                "animal_id": "TAG-1",
                "user_id": user.to_string(),
                "species": "cattle",
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "UPSTREAM_ERROR");

    let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prediction_logs")
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(logs, 0);
}

/// Answers every request with the same mixed-species output
struct CrossSpeciesClassifier;

#[async_trait]
impl BreedClassifier for CrossSpeciesClassifier {
    fn model_version(&self) -> &str {
        "cross-v1"
    }

    async fn classify(
        &self,
        _image: &[u8],
        _species: Species,
    ) -> Result<Vec<BreedPrediction>, ClassifierError> {
        Ok(vec![
            BreedPrediction::new("gir", 0.9),
            BreedPrediction::new("murrah", 0.6),
            BreedPrediction::new("unlisted_local", 0.2),
        ])
    }
}

#[tokio::test]
async fn test_predictions_restricted_to_requested_species() {
    let app = TestApp::with_state(|mut state| {
        state.classifier = Arc::new(CrossSpeciesClassifier);
        state
    })
    .await;
    let user = Uuid::new_v4();

    let buffalo = app.classify(user, "BUF-1", "buffalo").await;
    assert_eq!(buffalo["top_prediction"]["breed"], "murrah");
    let codes: Vec<&str> = buffalo["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["breed"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["murrah", "unlisted_local"]);

    let cattle = app.classify(user, "COW-1", "cattle").await;
    assert_eq!(cattle["top_prediction"]["breed"], "gir");
}

// =============================================================================
// Record query surface
// =============================================================================

#[tokio::test]
async fn test_records_require_auth() {
    let app = TestApp::new().await;
    let response = app.send(get("/api/records", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_records_listing_is_owner_scoped_and_paginated() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);

    for tag in ["A", "B", "C"] {
        app.classify(user, tag, "cattle").await;
    }
    app.classify(Uuid::new_v4(), "OTHER", "cattle").await;

    let first = body_json(app.send(get("/api/records?limit=2", Some(&token))).await).await;
    assert_eq!(first["records"].as_array().unwrap().len(), 2);
    assert_eq!(first["records"][0]["animal_id"], "C");
    assert_eq!(
        first["pagination"],
        json!({"total": 3, "limit": 2, "offset": 0, "has_more": true})
    );

    let last = body_json(
        app.send(get("/api/records?limit=2&offset=2", Some(&token)))
            .await,
    )
    .await;
    assert_eq!(last["records"].as_array().unwrap().len(), 1);
    assert_eq!(last["pagination"]["has_more"], false);

    let clamped = body_json(
        app.send(get("/api/records?limit=0&offset=-5", Some(&token)))
            .await,
    )
    .await;
    assert_eq!(clamped["pagination"]["limit"], 1);
    assert_eq!(clamped["pagination"]["offset"], 0);

    let far = app
        .send(get("/api/records?offset=9223372036854775807", Some(&token)))
        .await;
    assert_eq!(far.status(), StatusCode::OK);
    let far = body_json(far).await;
    assert!(far["records"].as_array().unwrap().is_empty());
    assert_eq!(far["pagination"]["offset"], i64::MAX);
    assert_eq!(far["pagination"]["has_more"], false);
}

#[tokio::test]
async fn test_records_filters() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);

    app.classify(user, "COW", "cattle").await;
    app.classify(user, "BUF", "buffalo").await;

    let buffalo = body_json(app.send(get("/api/records?species=buffalo", Some(&token))).await).await;
    assert_eq!(buffalo["pagination"]["total"], 1);
    assert_eq!(buffalo["records"][0]["animal_id"], "BUF");

    let verified = body_json(app.send(get("/api/records?status=verified", Some(&token))).await).await;
    assert_eq!(verified["pagination"]["total"], 0);

    let ignored = body_json(
        app.send(get("/api/records?status=archived&species=goat", Some(&token)))
            .await,
    )
    .await;
    assert_eq!(ignored["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_single_record_of_another_user_is_not_found() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let result = app.classify(owner, "TAG-1", "cattle").await;
    let record_id = result["record_id"].as_str().unwrap();

    let foreign = app
        .send(get(
            &format!("/api/records/{}", record_id),
            Some(&token_for(Uuid::new_v4())),
        ))
        .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let garbage = app
        .send(get("/api/records/not-a-uuid", Some(&token_for(owner))))
        .await;
    assert_eq!(garbage.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary_counts_page() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);

    app.classify(user, "COW-1", "cattle").await;
    app.classify(user, "COW-2", "cattle").await;
    app.classify(user, "BUF-1", "buffalo").await;

    let body = body_json(app.send(get("/api/records/summary", Some(&token))).await).await;
    let summary = &body["summary"];
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["pending"], 3);
    assert_eq!(summary["cattle"], 2);
    assert_eq!(summary["buffalo"], 1);
    assert_eq!(summary["breeds"]["gir"], 2);
    assert_eq!(summary["breeds"]["murrah"], 1);
    assert_eq!(body["pagination"]["total"], 3);
}

// =============================================================================
// Record update surface
// =============================================================================

async fn patch(app: &TestApp, user: Uuid, body: Value) -> axum::http::Response<Body> {
    app.send(json_request("PATCH", "/api/records", Some(&token_for(user)), body))
        .await
}

#[tokio::test]
async fn test_update_normalizes_manual_breed() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let id = app.classify(user, "TAG-1", "cattle").await["record_id"].clone();

    let response = patch(&app, user, json!({"id": id, "manual_breed": "Red Sindhi"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["record"]["manual_breed"], "red_sindhi");
    assert_eq!(body["record"]["final_breed"], "red_sindhi");
    assert_eq!(body["record"]["predicted_breed"], "gir");
}

#[tokio::test]
async fn test_update_verification_flow() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let id = app.classify(user, "TAG-1", "cattle").await["record_id"].clone();

    let pending = body_json(patch(&app, user, json!({"id": id, "verification_status": "pending"})).await).await;
    assert_eq!(pending["record"]["verification_status"], "pending");
    assert!(pending["record"]["verified_by"].is_null());

    let verified = body_json(
        patch(
            &app,
            user,
            json!({"id": id, "verification_status": "verified", "notes": "Hump and dewlap match"}),
        )
        .await,
    )
    .await;
    assert_eq!(verified["record"]["verification_status"], "verified");
    assert_eq!(verified["record"]["verified_by"], user.to_string());
    assert_eq!(verified["record"]["notes"], "Hump and dewlap match");

    let reopen = patch(&app, user, json!({"id": id, "verification_status": "pending"})).await;
    assert_eq!(reopen.status(), StatusCode::BAD_REQUEST);

    let rejected = patch(&app, user, json!({"id": id, "verification_status": "rejected"})).await;
    assert_eq!(rejected.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_of_foreign_record_is_not_found_and_unchanged() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let id = app.classify(owner, "TAG-1", "cattle").await["record_id"].clone();

    let response = patch(
        &app,
        Uuid::new_v4(),
        json!({"id": id, "manual_breed": "Ongole", "verification_status": "rejected"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(
        app.send(get(
            &format!("/api/records/{}", id.as_str().unwrap()),
            Some(&token_for(owner)),
        ))
        .await,
    )
    .await;
    assert!(body["record"]["manual_breed"].is_null());
    assert_eq!(body["record"]["verification_status"], "pending");
}

#[tokio::test]
async fn test_update_validation_errors() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let id = app.classify(user, "TAG-1", "cattle").await["record_id"].clone();

    let missing_id = patch(&app, user, json!({"notes": "x"})).await;
    assert_eq!(missing_id.status(), StatusCode::BAD_REQUEST);

    let malformed_id = patch(&app, user, json!({"id": "record-1", "notes": "x"})).await;
    assert_eq!(malformed_id.status(), StatusCode::BAD_REQUEST);

    let bad_status = patch(&app, user, json!({"id": id, "verification_status": "approved"})).await;
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);

    let anonymous = app
        .send(json_request("PATCH", "/api/records", None, json!({"id": id})))
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_json_blobs_and_final_breed_override() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let id = app.classify(user, "TAG-1", "cattle").await["record_id"].clone();

    let body = body_json(
        patch(
            &app,
            user,
            json!({
                "id": id,
                "final_breed": "Tharparkar",
                "location_data": {"district": "Anand", "lat": 22.55},
                "owner_details": {"name": "R. Desai"},
            }),
        )
        .await,
    )
    .await;

    assert_eq!(body["record"]["final_breed"], "tharparkar");
    assert_eq!(body["record"]["location_data"]["district"], "Anand");
    assert_eq!(body["record"]["owner_details"]["name"], "R. Desai");

    let cleared = body_json(patch(&app, user, json!({"id": id, "manual_breed": ""})).await).await;
    assert_eq!(cleared["record"]["final_breed"], "gir");
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_first_authenticated_request_registers_profile() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    app.classify(user, "TAG-1", "cattle").await;
    app.send(get("/api/records", Some(&token_for(user)))).await;

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE user_id = ?")
        .bind(user.to_string())
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(profiles, 1);
}

#[tokio::test]
async fn test_profile_created_on_first_access_and_updated() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();
    let token = token_for(user);

    let profile = body_json(app.send(get("/api/profile", Some(&token))).await).await;
    assert_eq!(profile["user_id"], user.to_string());
    assert_eq!(profile["is_verified"], false);

    let updated = body_json(
        app.send(json_request(
            "PATCH",
            "/api/profile",
            Some(&token),
            json!({"full_name": "Asha Patel", "district": "Anand", "is_verified": true}),
        ))
        .await,
    )
    .await;
    assert_eq!(updated["full_name"], "Asha Patel");
    assert_eq!(updated["district"], "Anand");
    assert_eq!(updated["is_verified"], false);
}

#[tokio::test]
async fn test_profile_duplicate_employee_id_conflicts() {
    let app = TestApp::new().await;
    let body = json!({"employee_id": "EMP-7"});

    let first = app
        .send(json_request("PATCH", "/api/profile", Some(&token_for(Uuid::new_v4())), body.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .send(json_request("PATCH", "/api/profile", Some(&token_for(Uuid::new_v4())), body))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let error = body_json(second).await;
    assert_eq!(error["error"]["code"], "CONFLICT");
}
