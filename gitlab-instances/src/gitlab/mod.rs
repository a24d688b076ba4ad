//! GitLab API access.
//!
//! The resolver only needs one call: fetch a project by its `vendor/name`
//! path. Both the client and the way it is built sit behind traits so callers
//! can substitute their own transport.

mod error;
mod project;
mod rest;

pub use error::GitLabError;
pub use project::Project;
pub use rest::{RestClient, RestClientFactory};

use async_trait::async_trait;

/// A client bound to one GitLab instance.
#[async_trait]
pub trait ProjectClient: Send + Sync {
    /// Fetches the project at `path` (e.g., "acme/widgets").
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError`] on transport failure, a missing project, or
    /// any non-success response.
    async fn get_project(&self, path: &str) -> Result<Project, GitLabError>;
}

/// Builds authenticated clients for a given instance.
pub trait ClientFactory: Send + Sync {
    /// Creates a client for the instance at `base_url` using `token`.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError`] if the client can't be constructed.
    fn connect(&self, base_url: &str, token: &str) -> Result<Box<dyn ProjectClient>, GitLabError>;
}
