//! Inference engine implementation
//!
//! Stateless per call: validation, preprocessing and risk bucketing need no
//! locking. The only shared state is the [`ModelCache`], consulted once per
//! `predict_one` and once per `predict_batch`.

use super::result::{BatchOutcome, ItemError, PredictionResult};
use super::InferenceConfig;
use crate::cache::{ModelCache, ModelDescription};
use crate::error::{CreditError, Result};
use crate::model::LoadedModel;
use crate::registry::{FsModelRegistry, ModelRegistry};
use crate::schema::{CreditRecord, FeatureSchema};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Scores credit applications against the configured model
pub struct InferenceEngine {
    config: InferenceConfig,
    cache: Arc<ModelCache>,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine over an existing cache
    pub fn new(config: InferenceConfig, cache: Arc<ModelCache>) -> Result<Self> {
        config.validate()?;

        let pool = match config.n_workers {
            Some(n_workers) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n_workers)
                    .thread_name(|i| format!("credit-batch-{}", i))
                    .build()
                    .map_err(|e| CreditError::Config(format!("Thread pool error: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self { config, cache, pool })
    }

    /// Build the filesystem registry and cache described by `config`
    pub fn from_config(config: InferenceConfig) -> Result<Self> {
        let registry: Arc<dyn ModelRegistry> =
            Arc::new(FsModelRegistry::with_roots(config.registry_roots.clone()));
        let cache = ModelCache::new(registry, Arc::new(FeatureSchema::credit()))
            .with_load_timeout(config.load_timeout());
        Self::new(config, Arc::new(cache))
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.cache.schema()
    }

    /// Score one application.
    ///
    /// Input is validated before the model is fetched, so a bad record is
    /// reported as a validation error even while the model is unavailable.
    pub fn predict_one(&self, record: &CreditRecord) -> Result<PredictionResult> {
        self.schema().validate(record)?;
        let model = self.current_model()?;
        let result = score(&model, record)?;
        debug!(
            model = %result.model,
            prediction = result.prediction,
            probability_good = result.probability_good_credit,
            risk_level = %result.risk_level,
            "Scored application"
        );
        Ok(result)
    }

    /// Score many applications with one model snapshot.
    ///
    /// Only a model fetch failure fails the call; validation and transform
    /// errors are reported per item, in input order.
    pub fn predict_batch(&self, records: &[CreditRecord]) -> Result<BatchOutcome> {
        let started = Instant::now();
        let model = self.current_model()?;

        let score_item = |(index, record): (usize, &CreditRecord)| {
            self.schema()
                .validate(record)
                .and_then(|_| score(&model, record))
                .map_err(|error| {
                    debug!(index, error = %error, "Batch item rejected");
                    ItemError { index, error }
                })
        };

        let results: Vec<std::result::Result<PredictionResult, ItemError>> = if self.config.parallel_batch {
            let run = || {
                records
                    .par_iter()
                    .enumerate()
                    .map(score_item)
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        } else {
            records.iter().enumerate().map(score_item).collect()
        };

        let outcome = BatchOutcome::new(
            results,
            model.id().clone(),
            started.elapsed().as_millis() as u64,
        );
        info!(
            model = %outcome.model,
            batch_size = outcome.total_processed,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            elapsed_ms = outcome.elapsed_ms,
            "Batch scored"
        );
        Ok(outcome)
    }

    /// Reload the configured model; in-flight requests keep their snapshot
    pub fn reload(&self) -> Result<Arc<LoadedModel>> {
        self.cache
            .reload(&self.config.model_name, &self.config.model_stage)
    }

    /// Load the configured model ahead of the first request
    pub fn warm_up(&self) -> bool {
        self.cache
            .warm_up(&self.config.model_name, &self.config.model_stage)
    }

    pub fn is_ready(&self) -> bool {
        self.cache
            .is_loaded(&self.config.model_name, &self.config.model_stage)
    }

    pub fn describe(&self) -> Vec<ModelDescription> {
        self.cache.describe()
    }

    fn current_model(&self) -> Result<Arc<LoadedModel>> {
        self.cache
            .get(&self.config.model_name, &self.config.model_stage)
    }
}

fn score(model: &LoadedModel, record: &CreditRecord) -> Result<PredictionResult> {
    let scored = model.score(record)?;
    Ok(PredictionResult::from_scored(scored, model.id()))
}
