// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project persistence.
//!
//! A store maps project IDs to serialized project documents. Sessions only
//! touch a store at explicit checkpoints: opening and saving.

use parking_lot::RwLock;
use splice_interchange::InterchangeError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension of stored projects
pub const PROJECT_EXTENSION: &str = "splice.json";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be read or written
    #[error(transparent)]
    Interchange(#[from] InterchangeError),

    /// No project with that ID
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Project ID cannot be used as a storage key
    #[error("Invalid project ID: {0:?}")]
    InvalidProjectId(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence collaborator
pub trait ProjectStore: Send + Sync {
    /// Load a serialized project, or `None` if it does not exist
    fn load(&self, project_id: &str) -> Result<Option<String>>;

    /// Save a serialized project, replacing any previous version
    fn save(&self, project_id: &str, serialized: &str) -> Result<()>;
}

fn check_project_id(project_id: &str) -> Result<()> {
    let valid = !project_id.is_empty()
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidProjectId(project_id.to_string()))
    }
}

/// Store kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects
    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    /// Check if the store holds no projects
    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, project_id: &str) -> Result<Option<String>> {
        check_project_id(project_id)?;
        Ok(self.projects.read().get(project_id).cloned())
    }

    fn save(&self, project_id: &str, serialized: &str) -> Result<()> {
        check_project_id(project_id)?;
        self.projects
            .write()
            .insert(project_id.to_string(), serialized.to_string());
        Ok(())
    }
}

/// Store writing one file per project into a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the project files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a project's file
    pub fn project_path(&self, project_id: &str) -> PathBuf {
        self.root.join(format!("{project_id}.{PROJECT_EXTENSION}"))
    }
}

impl ProjectStore for FileStore {
    fn load(&self, project_id: &str) -> Result<Option<String>> {
        check_project_id(project_id)?;
        match std::fs::read_to_string(self.project_path(project_id)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temporary file first so a failed save never leaves a
    /// truncated project behind.
    fn save(&self, project_id: &str, serialized: &str) -> Result<()> {
        check_project_id(project_id)?;
        let path = self.project_path(project_id);
        let staging = path.with_extension("tmp");
        std::fs::write(&staging, serialized)?;
        std::fs::rename(&staging, &path)?;
        tracing::debug!(path = %path.display(), bytes = serialized.len(), "Wrote project file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load("p1").unwrap().is_none());

        store.save("p1", "{}").unwrap();
        assert_eq!(store.load("p1").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("projects")).unwrap();
        assert!(store.load("demo").unwrap().is_none());

        store.save("demo", "first").unwrap();
        store.save("demo", "second").unwrap();
        assert_eq!(store.load("demo").unwrap().as_deref(), Some("second"));
        assert!(store.project_path("demo").exists());
        assert!(!store.project_path("demo").with_extension("tmp").exists());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let store = MemoryStore::new();
        for id in ["", "../escape", "a/b", "x.y"] {
            assert!(matches!(
                store.save(id, "{}"),
                Err(StoreError::InvalidProjectId(_))
            ));
        }
    }
}
