//! Filesystem-backed registry: `<root>/<name>/<stage>/artifact.json`

use super::ModelRegistry;
use crate::error::{CreditError, Result};
use crate::model::ModelArtifact;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// File name of a serialized artifact inside its stage directory
pub const ARTIFACT_FILE: &str = "artifact.json";

/// A name or stage must be a single directory name, never a path
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
        && !Path::new(segment).has_root()
}

fn check_segments(name: &str, stage: &str) -> Result<()> {
    if is_plain_segment(name) && is_plain_segment(stage) {
        Ok(())
    } else {
        Err(CreditError::Config(format!(
            "invalid model name or stage {:?}@{:?}",
            name, stage
        )))
    }
}

/// Reads artifacts from one or more search roots; the first root holding the
/// requested artifact wins. Stage directories match case-insensitively.
#[derive(Debug, Clone)]
pub struct FsModelRegistry {
    roots: Vec<PathBuf>,
}

impl FsModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    pub fn with_roots<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate the artifact file for `(name, stage)`
    pub fn find(&self, name: &str, stage: &str) -> Option<PathBuf> {
        check_segments(name, stage).ok()?;
        self.roots.iter().find_map(|root| {
            let model_dir = root.join(name);
            let exact = model_dir.join(stage).join(ARTIFACT_FILE);
            if exact.is_file() {
                return Some(exact);
            }
            fs::read_dir(&model_dir)
                .ok()?
                .filter_map(|entry| entry.ok())
                .find(|entry| {
                    entry
                        .file_name()
                        .to_str()
                        .is_some_and(|s| s.eq_ignore_ascii_case(stage))
                })
                .map(|entry| entry.path().join(ARTIFACT_FILE))
                .filter(|path| path.is_file())
        })
    }

    /// Write an artifact under the first root, at its own name and stage
    pub fn save(&self, artifact: &ModelArtifact) -> Result<PathBuf> {
        let root = self
            .roots
            .first()
            .ok_or_else(|| CreditError::Config("registry has no search roots".to_string()))?;
        check_segments(&artifact.name, &artifact.stage)?;
        let dir = root.join(&artifact.name).join(&artifact.stage);
        fs::create_dir_all(&dir)?;
        let path = dir.join(ARTIFACT_FILE);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), artifact)?;
        Ok(path)
    }

    fn read(path: &Path) -> Result<ModelArtifact> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl ModelRegistry for FsModelRegistry {
    fn load(&self, name: &str, stage: &str) -> Result<ModelArtifact> {
        check_segments(name, stage)?;
        let path = self.find(name, stage).ok_or_else(|| {
            CreditError::Config(format!(
                "no {} for {}@{} under {:?}",
                ARTIFACT_FILE, name, stage, self.roots
            ))
        })?;
        tracing::debug!(path = %path.display(), "Reading artifact");

        let artifact = Self::read(&path)?;
        if artifact.name != name || !artifact.stage.eq_ignore_ascii_case(stage) {
            return Err(CreditError::Config(format!(
                "{} holds {}@{}, expected {}@{}",
                path.display(),
                artifact.name,
                artifact.stage,
                name,
                stage
            )));
        }
        Ok(artifact)
    }

    fn describe(&self) -> String {
        format!("filesystem registry {:?}", self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CREDIT_MODEL_NAME;

    fn registry_with_outside_file() -> (tempfile::TempDir, FsModelRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("registry");
        fs::create_dir_all(root.join(CREDIT_MODEL_NAME)).unwrap();
        // Outside the registry root
        fs::create_dir_all(dir.path().join("leak")).unwrap();
        fs::write(dir.path().join("leak").join(ARTIFACT_FILE), "{}").unwrap();
        (dir, FsModelRegistry::new(root))
    }

    #[test]
    fn test_plain_segments() {
        assert!(is_plain_segment("production"));
        assert!(is_plain_segment("RDF_score_pipeline"));
        assert!(!is_plain_segment(""));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("a/b"));
        assert!(!is_plain_segment("a\\b"));
        assert!(!is_plain_segment("/etc"));
    }

    #[test]
    fn test_traversal_in_stage_is_rejected() {
        let (_dir, registry) = registry_with_outside_file();
        assert!(registry.find(CREDIT_MODEL_NAME, "../../leak").is_none());

        let err = registry.load(CREDIT_MODEL_NAME, "../../leak").unwrap_err();
        assert!(matches!(err, CreditError::Config(_)));
        assert!(err.to_string().contains("invalid model name or stage"));
    }

    #[test]
    fn test_traversal_in_name_is_rejected() {
        let (_dir, registry) = registry_with_outside_file();
        assert!(registry.find("..", "leak").is_none());
        assert!(registry.find("../leak", ".").is_none());
        assert!(matches!(registry.load("..", "leak"), Err(CreditError::Config(_))));
    }
}
