//! Dashboard aggregation over a page of records

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{AnimalRecord, Species, VerificationStatus};

/// Counts and averages for the dashboard cards
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSummary {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
    pub cattle: usize,
    pub buffalo: usize,
    /// Records whose displayed breed comes from a manual override
    pub manual_overrides: usize,
    /// Mean confidence over records that have one
    pub average_confidence: Option<f64>,
    /// Displayed breed → count
    pub breeds: BTreeMap<String, usize>,
}

/// Aggregate a slice of records
pub fn summarize(records: &[AnimalRecord]) -> RecordSummary {
    let mut summary = RecordSummary {
        total: records.len(),
        ..Default::default()
    };
    let mut confidence_sum = 0.0;
    let mut confidence_count = 0usize;

    for record in records {
        match record.verification_status {
            VerificationStatus::Pending => summary.pending += 1,
            VerificationStatus::Verified => summary.verified += 1,
            VerificationStatus::Rejected => summary.rejected += 1,
        }
        match record.species {
            Species::Cattle => summary.cattle += 1,
            Species::Buffalo => summary.buffalo += 1,
        }
        if record.manual_breed.is_some() {
            summary.manual_overrides += 1;
        }
        if let Some(confidence) = record.confidence_score {
            confidence_sum += confidence;
            confidence_count += 1;
        }
        if let Some(breed) = record.final_breed() {
            *summary.breeds.entry(breed.to_string()).or_insert(0) += 1;
        }
    }

    if confidence_count > 0 {
        summary.average_confidence = Some(confidence_sum / confidence_count as f64);
    }

    summary
}
