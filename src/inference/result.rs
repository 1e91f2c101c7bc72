//! Prediction and batch outcome types

use crate::error::CreditError;
use crate::model::{ArtifactId, Scored};
use crate::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Outcome of scoring one credit application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 = good credit, 0 = bad credit
    pub prediction: u8,
    pub probability_good_credit: f64,
    pub probability_bad_credit: f64,
    pub risk_level: RiskLevel,
    /// Artifact that produced this result
    pub model: ArtifactId,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    pub(crate) fn from_scored(scored: Scored, model: &ArtifactId) -> Self {
        Self {
            prediction: scored.label,
            probability_good_credit: scored.probabilities.good,
            probability_bad_credit: scored.probabilities.bad,
            risk_level: RiskLevel::classify(scored.probabilities.good),
            model: model.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_good_credit(&self) -> bool {
        self.prediction == 1
    }
}

/// A failed batch item, tagged with its position in the input
#[derive(Debug)]
pub struct ItemError {
    pub index: usize,
    pub error: CreditError,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}: {}", self.index, self.error)
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl Serialize for ItemError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ItemError", 4)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("status_code", &self.error.status_code())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.serialize_field("fields", &self.error.fields())?;
        state.end()
    }
}

/// Per-item outcomes of a batch call, in input order
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    #[serde(serialize_with = "serialize_items")]
    pub results: Vec<Result<PredictionResult, ItemError>>,
    pub total_processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Artifact every successful item was scored with
    pub model: ArtifactId,
    pub elapsed_ms: u64,
}

impl BatchOutcome {
    pub(crate) fn new(
        results: Vec<Result<PredictionResult, ItemError>>,
        model: ArtifactId,
        elapsed_ms: u64,
    ) -> Self {
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        Self {
            total_processed: results.len(),
            failed: results.len() - succeeded,
            succeeded,
            results,
            model,
            elapsed_ms,
        }
    }

    pub fn successes(&self) -> impl Iterator<Item = &PredictionResult> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = &ItemError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }
}

fn serialize_items<S: Serializer>(
    items: &[Result<PredictionResult, ItemError>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    struct Item<'a>(&'a Result<PredictionResult, ItemError>);

    impl Serialize for Item<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(2))?;
            match self.0 {
                Ok(result) => {
                    map.serialize_entry("status", "ok")?;
                    map.serialize_entry("result", result)?;
                }
                Err(error) => {
                    map.serialize_entry("status", "error")?;
                    map.serialize_entry("error", error)?;
                }
            }
            map.end()
        }
    }

    serializer.collect_seq(items.iter().map(Item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassProbabilities;

    fn id() -> ArtifactId {
        ArtifactId {
            name: "RDF_score_pipeline".into(),
            stage: "production".into(),
            version: "3".into(),
        }
    }

    fn scored(good: f64) -> Scored {
        let probabilities = ClassProbabilities::from_scores(1.0 - good, good).unwrap();
        Scored {
            label: probabilities.label(),
            probabilities,
        }
    }

    #[test]
    fn test_result_from_scored() {
        let result = PredictionResult::from_scored(scored(0.8), &id());
        assert_eq!(result.prediction, 1);
        assert!(result.is_good_credit());
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!((result.probability_good_credit + result.probability_bad_credit - 1.0).abs() < 1e-9);
        assert_eq!(result.model.version, "3");
    }

    #[test]
    fn test_batch_counts_and_json_shape() {
        let outcome = BatchOutcome::new(
            vec![
                Ok(PredictionResult::from_scored(scored(0.3), &id())),
                Err(ItemError {
                    index: 1,
                    error: CreditError::invalid_field("Age in years", "must be >= 18"),
                }),
            ],
            id(),
            2,
        );
        assert_eq!(outcome.total_processed, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors().next().map(|e| e.index), Some(1));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["results"][0]["status"], "ok");
        assert_eq!(json["results"][0]["result"]["risk_level"], "HIGH");
        assert_eq!(json["results"][1]["status"], "error");
        assert_eq!(json["results"][1]["error"]["status_code"], 400);
        assert_eq!(json["results"][1]["error"]["fields"][0], "Age in years");
    }
}
