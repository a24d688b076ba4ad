//! GitLab API error types.

use thiserror::Error;

/// Errors that can occur while talking to a GitLab instance.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The project doesn't exist or isn't visible to the token.
    #[error("Project '{path}' not found")]
    NotFound { path: String },

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The instance URL can't be used as an API base.
    #[error("Invalid instance URL '{url}'")]
    InvalidUrl { url: String },

    /// The token can't be sent as a header value.
    #[error("Access token contains characters not allowed in a header")]
    InvalidToken,
}
