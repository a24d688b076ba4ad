//! Resolver error types.

use crate::gitlab::GitLabError;
use thiserror::Error;

/// Configuration problems found while resolving a repository.
///
/// Remote call failures are not errors; they are reported to the messenger
/// and the fetch yields nothing.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The instance key has no entry in the credential store.
    #[error("No credential found for instance '{key}'")]
    MissingCredential { key: String },

    /// The credential has no personal access token.
    #[error("Credential for instance '{key}' has no personal_access_token")]
    MissingToken { key: String },

    /// A client for the instance couldn't be built.
    #[error("Failed to create GitLab client for instance '{key}': {source}")]
    Client {
        key: String,
        #[source]
        source: GitLabError,
    },

    /// An instance URL couldn't be turned into a match pattern.
    #[error("Invalid match pattern for instance '{key}': {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}
