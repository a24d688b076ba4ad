//! Persisted instance configuration.
//!
//! The registry reads the whole list of instances on load and writes a whole
//! replacement list on save. [`TomlInstanceStore`] keeps that list in a TOML
//! file:
//!
//! ```toml
//! [[instances]]
//! key = "work"
//! host = "gitlab.example.com"
//! url = "https://gitlab.example.com"
//! ```

mod error;

pub use error::StoreError;

use crate::instances::GitLabHost;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

/// Storage for the list of registered instances.
pub trait ConfigStore: Send + Sync {
    /// Returns every stored instance in stored order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage can't be read.
    fn load_instances(&self) -> Result<Vec<GitLabHost>, StoreError>;

    /// Replaces the stored list with `instances`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage can't be written.
    fn save_instances(&self, instances: &[GitLabHost]) -> Result<(), StoreError>;
}

/// On-disk layout of the instances file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct InstancesFile {
    #[serde(default)]
    instances: Vec<GitLabHost>,
}

/// A [`ConfigStore`] backed by a TOML file.
#[derive(Debug, Clone)]
pub struct TomlInstanceStore {
    path: PathBuf,
}

impl TomlInstanceStore {
    /// Creates a store for the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the instances file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlInstanceStore {
    fn load_instances(&self) -> Result<Vec<GitLabHost>, StoreError> {
        let path_str = self.path.display().to_string();

        if !self.path.exists() {
            debug!(path = %path_str, "Instances file missing, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| StoreError::IoError {
            path: path_str.clone(),
            source: e,
        })?;

        let file: InstancesFile = toml::from_str(&content).map_err(|e| StoreError::TomlError {
            path: path_str.clone(),
            source: e,
        })?;

        debug!(path = %path_str, count = file.instances.len(), "Loaded instances");
        Ok(file.instances)
    }

    fn save_instances(&self, instances: &[GitLabHost]) -> Result<(), StoreError> {
        let path_str = self.path.display().to_string();
        let content = toml::to_string_pretty(&InstancesFile {
            instances: instances.to_vec(),
        })?;

        // Write next to the target so the final rename stays on one filesystem.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_error = |e| StoreError::IoError {
            path: path_str.clone(),
            source: e,
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp.write_all(content.as_bytes()).map_err(io_error)?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::PersistError {
                path: path_str.clone(),
                source: e,
            })?;

        debug!(path = %path_str, count = instances.len(), "Saved instances");
        Ok(())
    }
}

/// A [`ConfigStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryInstanceStore {
    instances: Mutex<Vec<GitLabHost>>,
}

impl MemoryInstanceStore {
    /// Creates a store seeded with `instances`.
    pub fn new(instances: Vec<GitLabHost>) -> Self {
        Self {
            instances: Mutex::new(instances),
        }
    }
}

impl ConfigStore for MemoryInstanceStore {
    fn load_instances(&self) -> Result<Vec<GitLabHost>, StoreError> {
        Ok(self
            .instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save_instances(&self, instances: &[GitLabHost]) -> Result<(), StoreError> {
        *self
            .instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = instances.to_vec();
        Ok(())
    }
}
