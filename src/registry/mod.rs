//! Model registry seam
//!
//! The registry is the system of record for named, staged artifacts. The
//! inference core only ever reads from it, through [`ModelRegistry::load`].

mod fs;

pub use fs::{FsModelRegistry, ARTIFACT_FILE};

use crate::error::Result;
use crate::model::ModelArtifact;

/// Source of model artifacts addressed by `(name, stage)`.
///
/// Implementations may block for seconds; callers bound the wait.
pub trait ModelRegistry: Send + Sync {
    fn load(&self, name: &str, stage: &str) -> Result<ModelArtifact>;

    /// Short label for logs
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
