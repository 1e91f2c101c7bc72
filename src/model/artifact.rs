//! Model artifacts and their prepared, servable form

use super::classifier::{ClassProbabilities, Classifier};
use crate::error::{CreditError, Result};
use crate::preprocessing::{FittedParameters, Preprocessor};
use crate::schema::{CreditRecord, FeatureSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of the artifact that scored a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    pub name: String,
    pub stage: String,
    pub version: String,
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} (v{})", self.name, self.stage, self.version)
    }
}

/// Fitted classifier plus the transform parameters learned alongside it,
/// as handed over by the model registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub stage: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub classifier: Classifier,
    pub parameters: FittedParameters,
}

impl ModelArtifact {
    pub fn id(&self) -> ArtifactId {
        ArtifactId {
            name: self.name.clone(),
            stage: self.stage.clone(),
            version: self.version.clone(),
        }
    }
}

/// Classifier output for one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub label: u8,
    pub probabilities: ClassProbabilities,
}

/// An artifact compiled against the feature schema and ready to serve.
///
/// Immutable once built; shared between requests behind an `Arc`.
#[derive(Debug)]
pub struct LoadedModel {
    id: ArtifactId,
    artifact: ModelArtifact,
    preprocessor: Preprocessor,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    /// Compile the transform, check the classifier, and run the schema's
    /// sample record end to end. Any failure means the artifact is unusable.
    pub fn prepare(artifact: ModelArtifact, schema: Arc<FeatureSchema>) -> Result<Self> {
        artifact.classifier.check()?;
        let preprocessor = Preprocessor::new(schema, &artifact.parameters)?;
        if preprocessor.n_features() != artifact.classifier.n_features() {
            return Err(CreditError::Transform(format!(
                "parameters declare {} columns but the {} classifier expects {}",
                preprocessor.n_features(),
                artifact.classifier.kind(),
                artifact.classifier.n_features()
            )));
        }

        let model = Self {
            id: artifact.id(),
            artifact,
            preprocessor,
            loaded_at: Utc::now(),
        };
        model.smoke_test()?;
        Ok(model)
    }

    fn smoke_test(&self) -> Result<()> {
        if let Some(sample) = self.preprocessor.schema().sample_record() {
            let scored = self.score(sample)?;
            tracing::debug!(
                model = %self.id,
                label = scored.label,
                probability_good = scored.probabilities.good,
                "Smoke prediction passed"
            );
        }
        Ok(())
    }

    /// Transform and classify an already validated record
    pub fn score(&self, record: &CreditRecord) -> Result<Scored> {
        let features = self.preprocessor.transform(record)?;
        let probabilities = self.artifact.classifier.predict_proba(features.view())?;
        Ok(Scored {
            label: probabilities.label(),
            probabilities,
        })
    }

    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.preprocessor.schema()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
