//! Model artifacts and classifiers
//!
//! - [`ModelArtifact`]: what the registry hands over (classifier + fitted parameters)
//! - [`LoadedModel`]: an artifact compiled against the schema, shared read-only
//! - [`Classifier`]: random forest or logistic model producing class probabilities

mod artifact;
mod classifier;
mod decision_tree;

pub use artifact::{ArtifactId, LoadedModel, ModelArtifact, Scored};
pub use classifier::{ClassProbabilities, Classifier, LogisticRegression, RandomForest};
pub use decision_tree::{DecisionTree, TreeNode};
