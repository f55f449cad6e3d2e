//! POST /api/images
//!
//! Raw image body in, private storage reference out. The declared content
//! type must be `image/*` and the bytes themselves must sniff as an image.

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::storage::ObjectPath;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// `animal-images/<user_id>/<uuid>.<ext>`, ready for `/api/classify`
    pub image_url: String,
}

/// POST /api/images
pub async fn upload_image(
    State(state): State<AppState>,
    caller: AuthUser,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Json<UploadResponse>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ApiError::BadRequest("Upload must be an image.".to_string()));
    }

    let limit = state.max_upload_bytes;
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|_| {
        ApiError::BadRequest(format!("Image too large (max {} bytes).", limit))
    })?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Upload body is empty.".to_string()));
    }

    let kind = infer::get(&bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| ApiError::BadRequest("Uploaded file is not a valid image.".to_string()))?;

    let path = ObjectPath::new_upload(caller.user_id, kind.extension());
    state
        .store
        .put(&path, bytes.to_vec())
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    info!("Stored {} ({} bytes, {})", path, bytes.len(), kind.mime_type());

    Ok(Json(UploadResponse {
        success: true,
        image_url: path.to_string(),
    }))
}
