//! Artifact destinations.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::export::{Artifact, ExportError};

/// Completion signal of a save: the artifact and where it landed.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedArtifact {
    pub artifact: Artifact,
    pub path: PathBuf,
}

/// Somewhere artifacts can be written.
pub trait ArtifactSink {
    /// Store `artifact`. Returning `Ok` means the bytes are fully written.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Save`] if the artifact cannot be stored.
    fn save(&mut self, artifact: &Artifact) -> Result<SavedArtifact, ExportError>;
}

/// Writes artifacts into a directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&mut self, artifact: &Artifact) -> Result<SavedArtifact, ExportError> {
        let path = self.dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes).map_err(|source| ExportError::Save {
            filename: artifact.filename.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = artifact.bytes.len(), "saved artifact");
        Ok(SavedArtifact {
            artifact: artifact.clone(),
            path,
        })
    }
}

/// Keeps saved artifacts in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Vec<Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifacts in save order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.saved
    }

    pub fn last(&self) -> Option<&Artifact> {
        self.saved.last()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&mut self, artifact: &Artifact) -> Result<SavedArtifact, ExportError> {
        self.saved.push(artifact.clone());
        Ok(SavedArtifact {
            artifact: artifact.clone(),
            path: PathBuf::from(&artifact.filename),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportOptions, text_artifact};

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let artifact = text_artifact("hello", &ExportOptions::default());

        let saved = sink.save(&artifact).unwrap();
        assert_eq!(saved.path, dir.path().join("extracted_text.doc"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"hello");
        assert_eq!(saved.artifact, artifact);
    }

    #[test]
    fn directory_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.save(&text_artifact("first", &ExportOptions::default()))
            .unwrap();
        let saved = sink
            .save(&text_artifact("second", &ExportOptions::default()))
            .unwrap();
        assert_eq!(std::fs::read(saved.path).unwrap(), b"second");
    }

    #[test]
    fn missing_directory_is_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("does-not-exist"));
        let err = sink
            .save(&text_artifact("x", &ExportOptions::default()))
            .unwrap_err();
        assert!(matches!(err, ExportError::Save { ref filename, .. } if filename == "extracted_text.doc"));
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        let options = ExportOptions::default();
        sink.save(&text_artifact("a", &options)).unwrap();
        sink.save(&text_artifact("b", &options)).unwrap();
        assert_eq!(sink.artifacts().len(), 2);
        assert_eq!(sink.last().unwrap().bytes, b"b");
    }
}
