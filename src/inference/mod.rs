//! Inference engine module
//!
//! Provides credit scoring with:
//! - Single-record prediction (`predict_one`)
//! - Batch prediction with per-item outcomes, parallel via rayon
//! - One model snapshot per batch call
//! - Configuration from defaults, environment or a JSON file

mod config;
mod engine;
mod result;

pub use config::InferenceConfig;
pub use engine::InferenceEngine;
pub use result::{BatchOutcome, ItemError, PredictionResult};
