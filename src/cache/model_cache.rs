//! Lazily loaded, shared model cache
//!
//! One slot per `(name, stage)`. Readers of a loaded slot take only a read
//! lock. A slot runs at most one registry load at a time: misses and reloads
//! that find a load in flight wait on it instead of starting another, so a
//! cold key triggers exactly one registry load no matter how many callers
//! race on it.

use crate::error::{CreditError, Result};
use crate::model::LoadedModel;
use crate::registry::ModelRegistry;
use crate::schema::FeatureSchema;
use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default bound on how long a caller waits for a registry load, whether it
/// started the load or joined one already in flight
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Cache key; stage comparison is case-insensitive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub stage: String,
}

impl CacheKey {
    pub fn new(name: &str, stage: &str) -> Self {
        Self {
            name: name.to_string(),
            stage: stage.to_ascii_lowercase(),
        }
    }
}

/// Health/metadata snapshot of one cached artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    pub stage: String,
    pub version: String,
    pub classifier: String,
    pub n_features: usize,
    pub loaded_at: DateTime<Utc>,
    /// Successful registry loads for this key since process start
    pub load_count: u64,
}

/// Outcome of one registry load, shared by every caller waiting on it
#[derive(Default)]
struct PendingLoad {
    outcome: Mutex<Option<std::result::Result<Arc<LoadedModel>, String>>>,
    done: Condvar,
}

impl PendingLoad {
    fn finish(&self, outcome: std::result::Result<Arc<LoadedModel>, String>) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }

    /// `None` if the load is still running at `deadline`
    fn wait_until(&self, deadline: Instant) -> Option<std::result::Result<Arc<LoadedModel>, String>> {
        let mut outcome = self.outcome.lock();
        while outcome.is_none() {
            if self.done.wait_until(&mut outcome, deadline).timed_out() {
                break;
            }
        }
        outcome.clone()
    }
}

#[derive(Default)]
struct Slot {
    current: RwLock<Option<Arc<LoadedModel>>>,
    /// The registry load running for this key, if any
    in_flight: Mutex<Option<Arc<PendingLoad>>>,
    loads: AtomicU64,
}

/// Owner of every loaded artifact. Construct once at startup and share by `Arc`.
pub struct ModelCache {
    registry: Arc<dyn ModelRegistry>,
    schema: Arc<FeatureSchema>,
    load_timeout: Duration,
    slots: RwLock<HashMap<CacheKey, Arc<Slot>>>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("registry", &self.registry.describe())
            .field("load_timeout", &self.load_timeout)
            .field("keys", &self.slots.read().len())
            .finish()
    }
}

impl ModelCache {
    pub fn new(registry: Arc<dyn ModelRegistry>, schema: Arc<FeatureSchema>) -> Self {
        Self {
            registry,
            schema,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Builder method to bound registry loads
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    /// Cached artifact for the key, loading it on first use
    pub fn get(&self, name: &str, stage: &str) -> Result<Arc<LoadedModel>> {
        let key = CacheKey::new(name, stage);
        let slot = self.slot(&key);

        if let Some(model) = slot.current.read().clone() {
            debug!(model_name = name, stage, version = %model.id().version, "Model cache hit");
            return Ok(model);
        }

        let result = self.await_load(&slot, name, stage, false);
        if result.is_err() {
            self.forget_if_idle(&key, slot);
        }
        result
    }

    /// Force a fresh registry load and swap it in.
    ///
    /// Callers still holding the previous `Arc` keep a valid artifact. On
    /// failure the previous artifact (if any) stays cached. A load already in
    /// flight for the key is joined rather than duplicated.
    pub fn reload(&self, name: &str, stage: &str) -> Result<Arc<LoadedModel>> {
        let key = CacheKey::new(name, stage);
        let slot = self.slot(&key);

        let model = self.await_load(&slot, name, stage, true)?;
        info!(model = %model.id(), "Model reloaded");
        Ok(model)
    }

    /// Preload at startup. Failure is logged, not raised: the key will be
    /// retried on first request.
    pub fn warm_up(&self, name: &str, stage: &str) -> bool {
        match self.get(name, stage) {
            Ok(model) => {
                info!(model = %model.id(), "Model preloaded");
                true
            }
            Err(e) => {
                warn!(model_name = name, stage, error = %e, "Could not preload model, starting degraded");
                false
            }
        }
    }

    pub fn is_loaded(&self, name: &str, stage: &str) -> bool {
        self.slots
            .read()
            .get(&CacheKey::new(name, stage))
            .is_some_and(|slot| slot.current.read().is_some())
    }

    /// Snapshot of every loaded artifact, sorted by name then stage
    pub fn describe(&self) -> Vec<ModelDescription> {
        let slots: Vec<Arc<Slot>> = self.slots.read().values().cloned().collect();
        let mut out: Vec<ModelDescription> = slots
            .iter()
            .filter_map(|slot| {
                let model = slot.current.read().clone()?;
                let id = model.id();
                Some(ModelDescription {
                    name: id.name.clone(),
                    stage: id.stage.clone(),
                    version: id.version.clone(),
                    classifier: model.artifact().classifier.kind().to_string(),
                    n_features: model.preprocessor().n_features(),
                    loaded_at: model.loaded_at(),
                    load_count: slot.loads.load(Ordering::Relaxed),
                })
            })
            .collect();
        out.sort_by(|a, b| (&a.name, &a.stage).cmp(&(&b.name, &b.stage)));
        out
    }

    /// Keys holding a loaded artifact or a load in flight
    pub fn key_count(&self) -> usize {
        self.slots.read().len()
    }

    fn slot(&self, key: &CacheKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(key.clone()).or_default())
    }

    /// Drop an empty slot after a failed cold load, unless another caller holds it
    fn forget_if_idle(&self, key: &CacheKey, slot: Arc<Slot>) {
        let mut slots = self.slots.write();
        let idle = slot.current.read().is_none() && slot.in_flight.lock().is_none();
        // One reference in the map, one here
        if idle && Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }
        drop(slot);
    }

    /// Join the key's in-flight load or start one, then wait at most
    /// `load_timeout` for it. A load outliving its callers still installs.
    fn await_load(&self, slot: &Arc<Slot>, name: &str, stage: &str, force: bool) -> Result<Arc<LoadedModel>> {
        let (pending, joined) = {
            let mut in_flight = slot.in_flight.lock();
            if !force {
                // Installed while we were reaching for the lock
                if let Some(model) = slot.current.read().clone() {
                    return Ok(model);
                }
            }
            match in_flight.as_ref() {
                Some(pending) => (Arc::clone(pending), true),
                None => {
                    let pending = self.spawn_load(slot, name, stage)?;
                    *in_flight = Some(Arc::clone(&pending));
                    (pending, false)
                }
            }
        };

        if joined {
            debug!(model_name = name, stage, "Joining in-flight model load");
        }
        match pending.wait_until(Instant::now() + self.load_timeout) {
            Some(Ok(model)) => Ok(model),
            Some(Err(reason)) => Err(CreditError::model_unavailable(name, stage, reason)),
            None if joined => Err(CreditError::model_unavailable(
                name,
                stage,
                "timed out waiting for in-flight load",
            )),
            None => {
                warn!(model_name = name, stage, timeout = ?self.load_timeout, "Model load still running after timeout");
                Err(CreditError::model_unavailable(
                    name,
                    stage,
                    format!("registry load exceeded {:?}", self.load_timeout),
                ))
            }
        }
    }

    /// Registry load plus schema compilation on a loader thread. The loader
    /// installs a successful artifact itself, so late results are kept.
    fn spawn_load(&self, slot: &Arc<Slot>, name: &str, stage: &str) -> Result<Arc<PendingLoad>> {
        info!(model_name = name, stage, registry = %self.registry.describe(), "Loading model from registry");

        let pending = Arc::new(PendingLoad::default());
        let registry = Arc::clone(&self.registry);
        let schema = Arc::clone(&self.schema);
        let slot = Arc::clone(slot);
        let finished = Arc::clone(&pending);
        let (owned_name, owned_stage) = (name.to_string(), stage.to_string());

        std::thread::Builder::new()
            .name(format!("model-load-{}", name))
            .spawn(move || {
                let started = Instant::now();
                let loaded = registry
                    .load(&owned_name, &owned_stage)
                    .and_then(|artifact| LoadedModel::prepare(artifact, schema))
                    .map(Arc::new);
                let elapsed_ms = started.elapsed().as_millis() as u64;

                let outcome = match loaded {
                    Ok(model) => {
                        slot.loads.fetch_add(1, Ordering::Relaxed);
                        let previous = slot.current.write().replace(Arc::clone(&model));
                        info!(
                            model = %model.id(),
                            classifier = model.artifact().classifier.kind(),
                            n_features = model.preprocessor().n_features(),
                            previous_version = previous.as_ref().map(|m| m.id().version.as_str()).unwrap_or("none"),
                            elapsed_ms,
                            "Model loaded"
                        );
                        Ok(model)
                    }
                    Err(e) => {
                        warn!(model_name = %owned_name, stage = %owned_stage, elapsed_ms, error = %e, "Model load failed");
                        Err(e.to_string())
                    }
                };

                *slot.in_flight.lock() = None;
                drop(slot);
                finished.finish(outcome);
            })
            .map_err(|e| CreditError::model_unavailable(name, stage, format!("cannot spawn loader: {}", e)))?;

        Ok(pending)
    }
}
