//! Prediction ranking
//!
//! Classifier output is not trusted to be ordered or bounded. Ranking clamps
//! every confidence into [0, 1], drops non-finite scores and sorts by
//! descending confidence (stable, so equal scores keep classifier order).

use crate::models::BreedPrediction;

/// Confidence below which the caller is advised to retake the photo
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Number of predictions kept from remote models
pub const TOP_K: usize = 5;

/// Rank raw predictions: clamp, drop NaN/infinite, sort descending
pub fn rank(predictions: Vec<BreedPrediction>) -> Vec<BreedPrediction> {
    let mut ranked: Vec<BreedPrediction> = predictions
        .into_iter()
        .filter(|p| p.confidence.is_finite() && !p.breed.is_empty())
        .map(|p| BreedPrediction {
            confidence: p.confidence.clamp(0.0, 1.0),
            ..p
        })
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

/// True if confidences never increase along the list
pub fn is_ranked(predictions: &[BreedPrediction]) -> bool {
    predictions
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence)
}

/// Guidance text shown with a classification result
pub fn advice_for(confidence: f64) -> &'static str {
    if confidence < LOW_CONFIDENCE_THRESHOLD {
        "Low confidence. Try a clearer, side-view image in good lighting."
    } else {
        "Confidence high. For better accuracy, upload a side-view photo."
    }
}
