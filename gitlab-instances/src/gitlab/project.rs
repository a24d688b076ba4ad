//! Project payload returned by the GitLab API.

use serde::Deserialize;

/// The subset of a GitLab project used to build a repository record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    /// Full path including namespace (e.g., "acme/widgets").
    pub path_with_namespace: String,

    /// Project name.
    pub name: String,

    /// Project description, null when never set.
    #[serde(default)]
    pub description: Option<String>,

    /// Open issue count, omitted when issues are disabled.
    #[serde(default)]
    pub open_issues_count: Option<u64>,

    /// Web URL of the project.
    pub web_url: String,
}
