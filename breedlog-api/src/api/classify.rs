//! POST /api/classify

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use breedlog_common::Species;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::gateway::{classify_and_record, ClassificationInput, ClassificationOutcome};
use crate::AppState;

/// Request body; every field is required but checked by hand for clear 400s
#[derive(Debug, Default, Deserialize)]
pub struct ClassifyRequest {
    pub image_url: Option<String>,
    pub animal_id: Option<String>,
    pub user_id: Option<String>,
    pub species: Option<String>,
}

impl ClassifyRequest {
    fn validate(self) -> ApiResult<ClassificationInput> {
        let image_url = required(self.image_url, "image_url")?;
        let animal_id = required(self.animal_id, "animal_id")?;
        let user_id = required(self.user_id, "user_id")?;
        let species = required(self.species, "species")?;

        let user_id = Uuid::parse_str(&user_id)
            .map_err(|_| ApiError::BadRequest(format!("user_id '{}' is not a UUID", user_id)))?;
        let species: Species = species.parse()?;

        Ok(ClassificationInput {
            image_url,
            animal_id,
            user_id,
            species,
        })
    }
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required field: {}", field)))
}

/// POST /api/classify
///
/// The bearer subject must equal the body's `user_id`.
pub async fn classify(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ApiResult<Json<ClassificationOutcome>> {
    let Json(request) = payload?;
    let input = request.validate()?;

    if input.user_id != caller.user_id {
        return Err(ApiError::Unauthorized(
            "user_id does not match the authenticated user".to_string(),
        ));
    }

    let outcome = classify_and_record(&state, &input).await?;
    Ok(Json(outcome))
}
