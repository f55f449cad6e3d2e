//! # Breedlog Common Library
//!
//! Shared code for the breedlog service including:
//! - Domain models (breeds, profiles, animal records, prediction logs)
//! - Breed code normalization and prediction ranking
//! - Database schema and queries
//! - Configuration loading
//! - Dashboard aggregation

pub mod breed_code;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod predictions;
pub mod summary;
pub mod time;

pub use error::{Error, Result};
pub use models::{
    AnimalRecord, Breed, BreedPrediction, PredictionLogEntry, Profile, Species,
    VerificationStatus,
};
