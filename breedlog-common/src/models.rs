//! Domain models
//!
//! Mirrors the four persisted tables: `breeds`, `profiles`, `animal_records`
//! and `prediction_logs`.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Animal category constraining which breed codes are valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Cattle,
    Buffalo,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Cattle, Species::Buffalo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Cattle => "cattle",
            Species::Buffalo => "buffalo",
        }
    }

    /// Lenient parse for query filters: unknown values mean "no filter"
    pub fn parse_filter(value: Option<&str>) -> Option<Species> {
        value.and_then(|v| v.trim().parse().ok())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cattle" => Ok(Species::Cattle),
            "buffalo" => Ok(Species::Buffalo),
            other => Err(Error::InvalidInput(format!(
                "species must be 'cattle' or 'buffalo', got '{}'",
                other
            ))),
        }
    }
}

/// Human-review state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    /// Lenient parse for query filters: unknown values mean "no filter"
    pub fn parse_filter(value: Option<&str>) -> Option<VerificationStatus> {
        value.and_then(|v| v.trim().parse().ok())
    }

    /// Reviewed states record who made the decision
    pub fn stamps_verifier(&self) -> bool {
        matches!(self, VerificationStatus::Verified | VerificationStatus::Rejected)
    }

    /// Reviewed records never return to `pending`; verified and rejected may be re-reviewed.
    pub fn can_transition_to(&self, next: VerificationStatus) -> bool {
        match (self, next) {
            (VerificationStatus::Pending, _) => true,
            (_, VerificationStatus::Pending) => false,
            _ => true,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(Error::InvalidInput(format!(
                "verification_status must be one of pending, verified, rejected; got '{}'",
                other
            ))),
        }
    }
}

/// Breed catalog row (read-only reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breed {
    pub id: String,
    pub name: String,
    pub breed_code: String,
    pub species: Species,
    pub description: Option<String>,
    /// Arbitrary key-value characteristics (advantages, disadvantages, traits)
    pub characteristics: Value,
    pub native_region: Option<String>,
    pub is_indigenous: bool,
}

/// Field worker profile, one per authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub employee_id: Option<String>,
    pub designation: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a ranked prediction list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedPrediction {
    /// Breed code (e.g. `gir`, `murrah`)
    pub breed: String,
    /// Model-reported certainty in [0, 1]
    pub confidence: f64,
}

impl BreedPrediction {
    pub fn new(breed: impl Into<String>, confidence: f64) -> Self {
        Self {
            breed: breed.into(),
            confidence,
        }
    }
}

/// Append-only history entry for one classification attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub id: Uuid,
    pub record_id: Uuid,
    /// Full ranked list, descending confidence
    pub predictions: Vec<BreedPrediction>,
    pub model_version: String,
    pub processing_time_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-user animal observation record
///
/// `final_breed` is not a field: it is derived from `manual_breed` and
/// `predicted_breed` on every read and serialized alongside the stored columns.
#[derive(Debug, Clone)]
pub struct AnimalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub animal_id: String,
    pub species: Species,
    pub predicted_breed: Option<String>,
    pub manual_breed: Option<String>,
    pub confidence_score: Option<f64>,
    pub image_url: Option<String>,
    pub location_data: Option<Value>,
    pub owner_details: Option<Value>,
    pub verification_status: VerificationStatus,
    pub verified_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Prediction history, newest first (empty unless joined)
    pub prediction_logs: Vec<PredictionLogEntry>,
}

impl AnimalRecord {
    /// Displayed breed: manual override if present, else the prediction
    pub fn final_breed(&self) -> Option<&str> {
        self.manual_breed
            .as_deref()
            .or(self.predicted_breed.as_deref())
    }
}

impl Serialize for AnimalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AnimalRecord", 17)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("user_id", &self.user_id)?;
        s.serialize_field("animal_id", &self.animal_id)?;
        s.serialize_field("species", &self.species)?;
        s.serialize_field("predicted_breed", &self.predicted_breed)?;
        s.serialize_field("manual_breed", &self.manual_breed)?;
        s.serialize_field("final_breed", &self.final_breed())?;
        s.serialize_field("confidence_score", &self.confidence_score)?;
        s.serialize_field("image_url", &self.image_url)?;
        s.serialize_field("location_data", &self.location_data)?;
        s.serialize_field("owner_details", &self.owner_details)?;
        s.serialize_field("verification_status", &self.verification_status)?;
        s.serialize_field("verified_by", &self.verified_by)?;
        s.serialize_field("notes", &self.notes)?;
        s.serialize_field("created_at", &self.created_at)?;
        s.serialize_field("updated_at", &self.updated_at)?;
        s.serialize_field("prediction_logs", &self.prediction_logs)?;
        s.end()
    }
}
