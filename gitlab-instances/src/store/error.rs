//! Configuration store error types.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted instances.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read or write a file.
    #[error("Failed to access file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse instances file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize instances to TOML.
    #[error("Failed to serialize instances: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Failed to move the written file into place.
    #[error("Failed to replace instances file '{path}': {source}")]
    PersistError {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },
}
