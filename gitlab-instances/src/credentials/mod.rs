//! Credential lookup for registered instances.
//!
//! Each instance's `key` names an entry here. The entry holds one or more
//! named values; the resolver reads `personal_access_token`.

mod error;
mod file;

pub use error::CredentialError;
pub use file::{FileCredentialStore, KeyProvider};

use std::collections::{BTreeMap, HashMap};

/// Name of the value holding a GitLab personal access token.
pub const PERSONAL_ACCESS_TOKEN: &str = "personal_access_token";

/// Values stored under a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    values: BTreeMap<String, String>,
}

impl Credential {
    /// Creates a credential from its named values.
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Creates a credential holding only a personal access token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(PERSONAL_ACCESS_TOKEN.to_string(), token.into());
        Self { values }
    }

    /// Returns the named value, if present.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the personal access token, if present.
    pub fn personal_access_token(&self) -> Option<&str> {
        self.value(PERSONAL_ACCESS_TOKEN)
    }
}

/// Source of credentials, keyed by instance key.
pub trait CredentialStore: Send + Sync {
    /// Looks up the credential stored under `key`.
    fn get_credential(&self, key: &str) -> Option<Credential>;

    /// Returns true if an entry exists under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get_credential(key).is_some()
    }
}

/// A [`CredentialStore`] held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: HashMap<String, Credential>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential under `key`, replacing any previous one.
    pub fn with_credential(mut self, key: impl Into<String>, credential: Credential) -> Self {
        self.credentials.insert(key.into(), credential);
        self
    }

    /// Adds a token-only credential under `key`.
    pub fn with_token(self, key: impl Into<String>, token: impl Into<String>) -> Self {
        self.with_credential(key, Credential::with_token(token))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get_credential(&self, key: &str) -> Option<Credential> {
        self.credentials.get(key).cloned()
    }
}
