//! Credential store error types.

use thiserror::Error;

/// Errors that can occur while loading a key file.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Failed to read the key file.
    #[error("Failed to read key file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse key file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
