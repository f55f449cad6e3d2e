//! GET /api/breeds (public)

use axum::{
    extract::{Query, State},
    Json,
};
use breedlog_common::db::breeds;
use breedlog_common::{Breed, Species};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BreedsQuery {
    /// `cattle` or `buffalo`; anything else lists every species
    pub species: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BreedsResponse {
    pub breeds: Vec<Breed>,
    pub total: usize,
}

/// GET /api/breeds
pub async fn list_breeds(
    State(state): State<AppState>,
    Query(query): Query<BreedsQuery>,
) -> ApiResult<Json<BreedsResponse>> {
    let species = Species::parse_filter(query.species.as_deref());
    let breeds = breeds::list_breeds(&state.db, species).await?;

    Ok(Json(BreedsResponse {
        total: breeds.len(),
        breeds,
    }))
}
