//! Shared fixtures: a fitted credit artifact and controllable registries

#![allow(dead_code)]

use credit_inference::cache::ModelCache;
use credit_inference::error::{CreditError, Result};
use credit_inference::inference::{InferenceConfig, InferenceEngine};
use credit_inference::model::{
    Classifier, DecisionTree, LogisticRegression, ModelArtifact, RandomForest, TreeNode,
};
use credit_inference::preprocessing::{FittedParameters, NominalVocabulary, NumericStats};
use credit_inference::registry::ModelRegistry;
use credit_inference::schema::{FeatureSchema, CREDIT_MODEL_NAME};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const STAGE: &str = "production";

/// Column of the scaled "Duration in month"
pub const DURATION_COL: usize = 0;
/// Column of the ranked "Status of existing checking account"
pub const CHECKING_COL: usize = 6;

pub fn credit_parameters() -> FittedParameters {
    let schema = FeatureSchema::credit();
    let numeric = vec![
        NumericStats::new("Duration in month", 20.9, 12.06),
        NumericStats::new("Credit amount", 3271.3, 2822.7),
        NumericStats::new("Installment rate in percentage of disposable income", 2.97, 1.12),
        NumericStats::new("Age in years", 35.5, 11.4),
        NumericStats::new("Number of existing credits at this bank", 1.41, 0.58),
        NumericStats::new("Number of people being liable to provide maintenance for", 1.16, 0.36),
    ];
    let nominal = vec![
        NominalVocabulary::new(
            "Purpose",
            ["A40", "A41", "A410", "A42", "A43", "A44", "A45", "A46", "A48", "A49"],
        ),
        NominalVocabulary::new("Personal status and sex", ["A91", "A92", "A93", "A94"]),
        NominalVocabulary::new("Other debtors / guarantors", ["A101", "A102", "A103"]),
        NominalVocabulary::new("Property", ["A121", "A122", "A123", "A124"]),
        NominalVocabulary::new("Other installment plans", ["A141", "A142", "A143"]),
        NominalVocabulary::new("Housing", ["A151", "A152", "A153"]),
        NominalVocabulary::new("Telephone", ["A191", "A192"]),
        NominalVocabulary::new("foreign worker", ["A201", "A202"]),
    ];
    FittedParameters::from_parts(&schema, numeric, nominal)
}

/// Two stumps: no checking account history and long durations lean bad
pub fn forest_classifier(n_features: usize) -> Classifier {
    let checking = DecisionTree::new(TreeNode::split(
        CHECKING_COL,
        0.5,
        TreeNode::leaf(vec![0.8, 0.2]),
        TreeNode::leaf(vec![0.25, 0.75]),
    ));
    let duration = DecisionTree::new(TreeNode::split(
        DURATION_COL,
        0.5,
        TreeNode::leaf(vec![0.3, 0.7]),
        TreeNode::leaf(vec![0.7, 0.3]),
    ));
    Classifier::RandomForest(RandomForest {
        n_features,
        trees: vec![checking, duration],
    })
}

pub fn forest_artifact(version: &str) -> ModelArtifact {
    let parameters = credit_parameters();
    ModelArtifact {
        name: CREDIT_MODEL_NAME.to_string(),
        stage: STAGE.to_string(),
        version: version.to_string(),
        description: Some("test forest".to_string()),
        classifier: forest_classifier(parameters.n_features()),
        parameters,
    }
}

/// Logistic model whose only non-zero weight is on the scaled duration
pub fn logistic_artifact(version: &str, duration_weight: f64, intercept: f64) -> ModelArtifact {
    let parameters = credit_parameters();
    let mut weights = vec![0.0; parameters.n_features()];
    weights[DURATION_COL] = duration_weight;
    ModelArtifact {
        name: CREDIT_MODEL_NAME.to_string(),
        stage: STAGE.to_string(),
        version: version.to_string(),
        description: None,
        classifier: Classifier::Logistic(LogisticRegression { weights, intercept }),
        parameters,
    }
}

/// In-memory registry with a load counter, optional delay and failure switch
pub struct StubRegistry {
    artifact: Mutex<ModelArtifact>,
    loads: AtomicUsize,
    delay: Mutex<Duration>,
    failing: AtomicBool,
}

impl StubRegistry {
    pub fn new(artifact: ModelArtifact) -> Arc<Self> {
        Arc::new(Self {
            artifact: Mutex::new(artifact),
            loads: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            failing: AtomicBool::new(false),
        })
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn set_artifact(&self, artifact: ModelArtifact) {
        *self.artifact.lock() = artifact;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ModelRegistry for StubRegistry {
    fn load(&self, name: &str, stage: &str) -> Result<ModelArtifact> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CreditError::Config(format!("registry down for {}@{}", name, stage)));
        }
        Ok(self.artifact.lock().clone())
    }
}

pub fn cache_over(registry: Arc<StubRegistry>) -> Arc<ModelCache> {
    Arc::new(ModelCache::new(registry, Arc::new(FeatureSchema::credit())))
}

pub fn engine_over(registry: Arc<StubRegistry>) -> InferenceEngine {
    engine_with_config(registry, InferenceConfig::default())
}

pub fn engine_with_config(registry: Arc<StubRegistry>, config: InferenceConfig) -> InferenceEngine {
    let cache = ModelCache::new(registry, Arc::new(FeatureSchema::credit()))
        .with_load_timeout(config.load_timeout());
    InferenceEngine::new(config, Arc::new(cache)).unwrap()
}
