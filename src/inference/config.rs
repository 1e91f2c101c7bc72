//! Inference configuration

use crate::error::{CreditError, Result};
use crate::schema::CREDIT_MODEL_NAME;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the inference engine and its model cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Registered model name
    pub model_name: String,

    /// Deployment stage to serve
    pub model_stage: String,

    /// Upper bound on a registry load in milliseconds
    pub load_timeout_ms: u64,

    /// Score batch items in parallel
    pub parallel_batch: bool,

    /// Dedicated worker count for batch scoring; `None` uses the global rayon pool
    pub n_workers: Option<usize>,

    /// Filesystem registry search roots, first match wins
    pub registry_roots: Vec<PathBuf>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_name: CREDIT_MODEL_NAME.to_string(),
            model_stage: "production".to_string(),
            load_timeout_ms: 30_000,
            parallel_batch: true,
            n_workers: None,
            registry_roots: vec![PathBuf::from("./model"), PathBuf::from("./models")],
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `CREDIT_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Read a JSON config file; absent keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CreditError::Config(format!("cannot open config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CREDIT_MODEL_NAME`, `CREDIT_MODEL_STAGE`, `CREDIT_LOAD_TIMEOUT_MS`,
    /// `CREDIT_PARALLEL_BATCH`, `CREDIT_WORKERS` and `CREDIT_REGISTRY_ROOTS`
    /// (colon-separated) when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(name) = std::env::var("CREDIT_MODEL_NAME") {
            self.model_name = name;
        }
        if let Ok(stage) = std::env::var("CREDIT_MODEL_STAGE") {
            self.model_stage = stage;
        }
        if let Some(ms) = std::env::var("CREDIT_LOAD_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.load_timeout_ms = ms;
        }
        if let Some(parallel) = std::env::var("CREDIT_PARALLEL_BATCH")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.parallel_batch = parallel;
        }
        if let Some(n) = std::env::var("CREDIT_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.n_workers = Some(n);
        }
        if let Ok(roots) = std::env::var("CREDIT_REGISTRY_ROOTS") {
            let roots: Vec<PathBuf> = std::env::split_paths(&roots).collect();
            if !roots.is_empty() {
                self.registry_roots = roots;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(CreditError::Config("model_name must not be empty".to_string()));
        }
        if self.model_stage.trim().is_empty() {
            return Err(CreditError::Config("model_stage must not be empty".to_string()));
        }
        if self.load_timeout_ms == 0 {
            return Err(CreditError::Config("load_timeout_ms must be positive".to_string()));
        }
        if self.n_workers == Some(0) {
            return Err(CreditError::Config("n_workers must be positive".to_string()));
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Builder method to set the served model
    pub fn with_model(mut self, name: impl Into<String>, stage: impl Into<String>) -> Self {
        self.model_name = name.into();
        self.model_stage = stage.into();
        self
    }

    /// Builder method to set the load timeout
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder method to set number of batch workers
    pub fn with_n_workers(mut self, n: usize) -> Self {
        self.n_workers = Some(n);
        self
    }

    /// Builder method to toggle parallel batch scoring
    pub fn with_parallel_batch(mut self, parallel: bool) -> Self {
        self.parallel_batch = parallel;
        self
    }

    /// Builder method to replace registry search roots
    pub fn with_registry_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.registry_roots = vec![root.into()];
        self
    }
}
