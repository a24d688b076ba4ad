//! A single registered GitLab instance.

use serde::{Deserialize, Serialize};

/// A hosted instance of GitLab.
///
/// Values are built once at the registry boundary and never mutated; an
/// edit replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabHost {
    /// Identifier of the instance, also the credential lookup key.
    pub key: String,

    /// Bare domain name (e.g., "gitlab.example.com").
    pub host: String,

    /// Base URL of the instance (e.g., "https://gitlab.example.com").
    pub url: String,
}

impl GitLabHost {
    /// Creates a new host record.
    pub fn new(key: impl Into<String>, host: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            host: host.into(),
            url: url.into(),
        }
    }
}
