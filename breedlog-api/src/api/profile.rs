//! Caller's own profile

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use breedlog_common::db::profiles::{self, ProfileChanges};
use breedlog_common::Profile;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/profile
///
/// First authenticated access creates an empty profile.
pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Profile>> {
    let profile = profiles::ensure_profile(&state.db, caller.user_id).await?;
    Ok(Json(profile))
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<ProfileChanges>, JsonRejection>,
) -> ApiResult<Json<Profile>> {
    let Json(changes) = payload?;
    let profile = profiles::update_profile(&state.db, caller.user_id, &changes).await?;
    info!("Profile updated for {}", caller.user_id);
    Ok(Json(profile))
}
