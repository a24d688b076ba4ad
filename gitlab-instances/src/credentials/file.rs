//! TOML-backed credential store.

use crate::credentials::{Credential, CredentialError, CredentialStore, PERSONAL_ACCESS_TOKEN};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

/// Where the values of a key come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum KeyProvider {
    /// Values written directly in the key file.
    Config {
        /// Named values (e.g., `personal_access_token`).
        #[serde(default)]
        values: BTreeMap<String, String>,
    },

    /// A single value read from an environment variable at lookup time.
    Env {
        /// Environment variable holding the value.
        variable: String,
        /// Name the value is stored under (defaults to `personal_access_token`).
        #[serde(default = "default_field")]
        field: String,
    },
}

fn default_field() -> String {
    PERSONAL_ACCESS_TOKEN.to_string()
}

#[derive(Debug, Deserialize)]
struct KeysFile {
    #[serde(default)]
    keys: HashMap<String, KeyProvider>,
}

/// A [`CredentialStore`] loaded from a TOML key file.
///
/// ```toml
/// [keys.work]
/// provider = "config"
/// values = { personal_access_token = "glpat-..." }
///
/// [keys.cloud]
/// provider = "env"
/// variable = "GITLAB_COM_TOKEN"
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileCredentialStore {
    keys: HashMap<String, KeyProvider>,
}

impl FileCredentialStore {
    /// Loads the key file at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let path_str = path.display().to_string();

        if !path.exists() {
            warn!(path = %path_str, "Key file missing, no credentials available");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| CredentialError::IoError {
            path: path_str.clone(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| CredentialError::TomlError {
            path: path_str,
            source: e,
        })
    }

    /// Parses a key file from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: KeysFile = toml::from_str(content)?;
        debug!(count = file.keys.len(), "Loaded keys");
        Ok(Self { keys: file.keys })
    }
}

impl CredentialStore for FileCredentialStore {
    fn get_credential(&self, key: &str) -> Option<Credential> {
        match self.keys.get(key)? {
            KeyProvider::Config { values } => Some(Credential::new(values.clone())),
            KeyProvider::Env { variable, field } => {
                let mut values = BTreeMap::new();
                match std::env::var(variable) {
                    Ok(value) => {
                        values.insert(field.clone(), value);
                    }
                    Err(_) => {
                        warn!(key, variable = %variable, "Key variable is not set");
                    }
                }
                Some(Credential::new(values))
            }
        }
    }

    // An env-backed key exists even while its variable is unset.
    fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }
}
