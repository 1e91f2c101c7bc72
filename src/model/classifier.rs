//! Binary probabilistic classifiers loaded from an artifact

use super::decision_tree::DecisionTree;
use crate::error::{CreditError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

const N_CLASSES: usize = 2;

/// Class probabilities for one record. Both in `[0, 1]`, summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// Class 0: bad credit
    pub bad: f64,
    /// Class 1: good credit
    pub good: f64,
}

impl ClassProbabilities {
    /// Clamp and renormalise raw class scores
    pub fn from_scores(bad: f64, good: f64) -> Result<Self> {
        let bad = if bad.is_nan() { bad } else { bad.clamp(0.0, 1.0) };
        let good = if good.is_nan() { good } else { good.clamp(0.0, 1.0) };
        let total = bad + good;
        if !total.is_finite() || total <= 0.0 {
            return Err(CreditError::Transform(format!(
                "classifier produced unusable probabilities [{}, {}]",
                bad, good
            )));
        }
        Ok(Self {
            bad: bad / total,
            good: good / total,
        })
    }

    /// Argmax class; ties resolve to class 0
    pub fn label(&self) -> u8 {
        if self.good > self.bad {
            1
        } else {
            0
        }
    }
}

/// Averaged ensemble of classification trees (soft voting)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<ClassProbabilities> {
        let mut totals = [0.0; N_CLASSES];
        for tree in &self.trees {
            let dist = tree.predict_distribution(x)?;
            for (acc, p) in totals.iter_mut().zip(dist) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        ClassProbabilities::from_scores(totals[0] / n, totals[1] / n)
    }
}

/// `p(good) = sigmoid(w · x + intercept)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<ClassProbabilities> {
        let z: f64 = self
            .weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept;
        let good = 1.0 / (1.0 + (-z).exp());
        ClassProbabilities::from_scores(1.0 - good, good)
    }
}

/// Classifier stored in a model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    Logistic(LogisticRegression),
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::RandomForest(_) => "random_forest",
            Classifier::Logistic(_) => "logistic",
        }
    }

    /// Width of the feature vector the classifier expects
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::RandomForest(rf) => rf.n_features,
            Classifier::Logistic(lr) => lr.weights.len(),
        }
    }

    /// Structural validation run once at load time
    pub fn check(&self) -> Result<()> {
        match self {
            Classifier::RandomForest(rf) => {
                if rf.trees.is_empty() {
                    return Err(CreditError::Transform("random forest has no trees".to_string()));
                }
                for (i, tree) in rf.trees.iter().enumerate() {
                    tree.check(rf.n_features, N_CLASSES)
                        .map_err(|e| CreditError::Transform(format!("tree {}: {}", i, e)))?;
                }
            }
            Classifier::Logistic(lr) => {
                if lr.weights.is_empty() {
                    return Err(CreditError::Transform("logistic model has no weights".to_string()));
                }
                if lr.weights.iter().any(|w| !w.is_finite()) || !lr.intercept.is_finite() {
                    return Err(CreditError::Transform(
                        "logistic model has non-finite coefficients".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Class probabilities for one encoded feature vector
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Result<ClassProbabilities> {
        if x.len() != self.n_features() {
            return Err(CreditError::Transform(format!(
                "classifier expects {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        match self {
            Classifier::RandomForest(rf) => rf.predict_proba(x),
            Classifier::Logistic(lr) => lr.predict_proba(x),
        }
    }
}
