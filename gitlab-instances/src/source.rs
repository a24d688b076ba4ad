//! Repository sources.
//!
//! A host application may accept repository URLs from several hosting
//! services. Each service is a [`RepositorySource`]; the first source that
//! matches a URL is the one asked to fetch it.

use crate::resolver::{GitLabResolver, RepositoryRecord, ResolveError};
use async_trait::async_trait;

/// A hosting service that can resolve repository URLs.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Stable identifier (e.g., "gitlab").
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> &'static str;

    /// Returns true if `uri` belongs to this source. Must not touch the network.
    fn matches(&self, uri: &str) -> bool;

    /// Describes the URL shapes this source accepts.
    fn help_text(&self) -> String;

    /// Fetches repository metadata for `uri`.
    async fn fetch(&self, uri: &str) -> Result<Option<RepositoryRecord>, ResolveError>;
}

#[async_trait]
impl RepositorySource for GitLabResolver {
    fn id(&self) -> &'static str {
        "gitlab"
    }

    fn label(&self) -> &'static str {
        "GitLab"
    }

    fn matches(&self, uri: &str) -> bool {
        GitLabResolver::matches(self, uri)
    }

    fn help_text(&self) -> String {
        GitLabResolver::help_text(self)
    }

    async fn fetch(&self, uri: &str) -> Result<Option<RepositoryRecord>, ResolveError> {
        GitLabResolver::fetch(self, uri).await
    }
}

/// Returns the first source that accepts `uri`.
pub fn find_source<'a>(
    sources: &'a [Box<dyn RepositorySource>],
    uri: &str,
) -> Option<&'a dyn RepositorySource> {
    sources
        .iter()
        .find(|source| source.matches(uri))
        .map(|source| &**source)
}
