//! GET /api/storage/:bucket/*key
//!
//! Public bucket objects are served to anyone; private objects only to the
//! owner named by the key prefix.

use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::storage::{Bucket, ObjectPath};
use crate::AppState;

/// GET /api/storage/:bucket/*key
pub async fn get_object(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Path((bucket, key)): Path<(String, String)>,
) -> ApiResult<Response> {
    let not_found = || ApiError::NotFound(format!("Object {}/{} not found", bucket, key));

    let bucket_kind = Bucket::parse(&bucket).ok_or_else(not_found)?;
    let path = ObjectPath::new(bucket_kind, key.trim_start_matches('/')).map_err(|_| not_found())?;

    if !path.readable_by(caller.map(|c| c.user_id)) {
        return Err(not_found());
    }

    let bytes = state
        .store
        .get(&path)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?
        .ok_or_else(not_found)?;

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(([(CONTENT_TYPE, content_type)], bytes).into_response())
}
