//! Breed classifier seam
//!
//! The gateway only sees `BreedClassifier`. Output need not be sorted or
//! bounded; ranking happens in the gateway.

use async_trait::async_trait;
use breedlog_common::{BreedPrediction, Species};
use thiserror::Error;

use crate::error::ApiError;

pub mod remote;

pub use remote::RemoteClassifier;

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Inference failed: HTTP {0}")]
    ApiError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No predictions returned by model")]
    NoPredictions,
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[async_trait]
pub trait BreedClassifier: Send + Sync {
    /// Label stored with every prediction log entry
    fn model_version(&self) -> &str;

    /// Raw (breed code, confidence) pairs for the image
    async fn classify(
        &self,
        image: &[u8],
        species: Species,
    ) -> Result<Vec<BreedPrediction>, ClassifierError>;
}

/// Fixed predictions per species
pub struct MockClassifier {
    version: String,
}

impl MockClassifier {
    pub const DEFAULT_VERSION: &'static str = "mock-v1";

    pub fn new() -> Self {
        Self::with_version(Self::DEFAULT_VERSION)
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BreedClassifier for MockClassifier {
    fn model_version(&self) -> &str {
        &self.version
    }

    async fn classify(
        &self,
        _image: &[u8],
        species: Species,
    ) -> Result<Vec<BreedPrediction>, ClassifierError> {
        let fixed: &[(&str, f64)] = match species {
            Species::Cattle => &[("gir", 0.85), ("sahiwal", 0.12), ("jersey_cross", 0.03)],
            Species::Buffalo => &[("murrah", 0.78), ("mehsana", 0.15), ("jaffarabadi", 0.07)],
        };
        Ok(fixed
            .iter()
            .map(|(breed, confidence)| BreedPrediction::new(*breed, *confidence))
            .collect())
    }
}
