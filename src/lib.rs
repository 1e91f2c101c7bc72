//! Credit Inference - real-time creditworthiness scoring
//!
//! Scores credit applications against a registry-served model with the same
//! feature transform the model was trained with.
//!
//! # Modules
//!
//! ## Input
//! - [`schema`] - Field inventory, validation policies, raw records
//! - [`preprocessing`] - Ordinal mapping, one-hot expansion, standard scaling
//!
//! ## Models
//! - [`model`] - Artifacts, random forest and logistic classifiers
//! - [`registry`] - Model registry seam and filesystem registry
//! - [`cache`] - Shared, lazily loaded model cache with atomic reload
//!
//! ## Scoring
//! - [`risk`] - LOW / MEDIUM / HIGH risk bucketing
//! - [`inference`] - Single and batch prediction
//!
//! ## Interface
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Input
pub mod schema;
pub mod preprocessing;

// Models
pub mod model;
pub mod registry;
pub mod cache;

// Scoring
pub mod risk;
pub mod inference;

// Interface
pub mod cli;

pub use error::{CreditError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cache::{ModelCache, ModelDescription};
    pub use crate::error::{CreditError, FieldViolation, Result};
    pub use crate::inference::{BatchOutcome, InferenceConfig, InferenceEngine, PredictionResult};
    pub use crate::model::{ArtifactId, Classifier, LoadedModel, ModelArtifact};
    pub use crate::preprocessing::{FittedParameters, Preprocessor};
    pub use crate::registry::{FsModelRegistry, ModelRegistry};
    pub use crate::risk::RiskLevel;
    pub use crate::schema::{sample_application, CreditRecord, FeatureSchema, FieldValue};
}
