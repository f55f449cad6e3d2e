//! Classification gateway
//!
//! Fetch image → classify → rank → upsert record → append prediction log.
//! The upsert is on the primary path; the log write is best-effort.

use breedlog_common::db::{breeds, prediction_logs, records};
use breedlog_common::predictions::{advice_for, rank};
use breedlog_common::time::elapsed_millis;
use breedlog_common::{BreedPrediction, Species};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::image_fetch::fetch_image;
use crate::AppState;

/// Validated classification input
#[derive(Debug, Clone)]
pub struct ClassificationInput {
    pub image_url: String,
    pub animal_id: String,
    pub user_id: Uuid,
    pub species: Species,
}

/// Classification result returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationOutcome {
    pub success: bool,
    pub record_id: Uuid,
    /// False when an existing record for the same animal was overwritten
    pub created: bool,
    pub predictions: Vec<BreedPrediction>,
    pub top_prediction: BreedPrediction,
    pub processing_time_ms: u64,
    pub model_version: String,
    pub advice: String,
    /// Catalog characteristics of the top breed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_info: Option<Value>,
}

/// Run one classification for an already-authorized caller
pub async fn classify_and_record(
    state: &AppState,
    input: &ClassificationInput,
) -> ApiResult<ClassificationOutcome> {
    let started = Instant::now();

    let image = fetch_image(
        state.store.as_ref(),
        &state.http,
        &input.image_url,
        input.user_id,
    )
    .await?;

    let raw = state.classifier.classify(&image, input.species).await?;
    let foreign = other_species_codes(state, input.species).await?;
    let predictions = rank(
        raw.into_iter()
            .filter(|p| !foreign.contains(&p.breed))
            .collect(),
    );
    let top = predictions.first().cloned().ok_or_else(|| {
        ApiError::Upstream(format!(
            "Classifier returned no {} predictions",
            input.species
        ))
    })?;

    let processing_time_ms = elapsed_millis(started);
    let model_version = state.classifier.model_version().to_string();

    let outcome = records::upsert_classification(
        &state.db,
        &records::ClassificationWrite {
            user_id: input.user_id,
            animal_id: &input.animal_id,
            species: input.species,
            top: &top,
            image_url: &input.image_url,
        },
    )
    .await?;

    if let Err(e) = prediction_logs::insert_log(
        &state.db,
        outcome.record_id,
        &predictions,
        &model_version,
        processing_time_ms,
    )
    .await
    {
        let message = format!(
            "Prediction log write failed for record {}: {}",
            outcome.record_id, e
        );
        warn!("{}", message);
        state.record_error(message).await;
    }

    let breed_info = match breeds::find_by_code(&state.db, &top.breed).await {
        Ok(breed) => breed.map(|b| b.characteristics),
        Err(e) => {
            warn!("Breed lookup for {} failed: {}", top.breed, e);
            None
        }
    };

    info!(
        record_id = %outcome.record_id,
        created = outcome.created,
        breed = %top.breed,
        confidence = top.confidence,
        processing_time_ms,
        "Classified animal {}",
        input.animal_id
    );

    Ok(ClassificationOutcome {
        success: true,
        record_id: outcome.record_id,
        created: outcome.created,
        advice: advice_for(top.confidence).to_string(),
        predictions,
        top_prediction: top,
        processing_time_ms,
        model_version,
        breed_info,
    })
}

/// Catalog codes belonging to any species other than `species`
///
/// Codes outside the catalog pass through untouched.
async fn other_species_codes(state: &AppState, species: Species) -> ApiResult<HashSet<String>> {
    let catalog = breeds::list_breeds(&state.db, None).await?;
    Ok(catalog
        .into_iter()
        .filter(|breed| breed.species != species)
        .map(|breed| breed.breed_code)
        .collect())
}
