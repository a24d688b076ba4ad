//! Instance registry error types.

use crate::instances::ValidationErrors;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while loading or saving the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configuration store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The submission failed validation; nothing was saved.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}
