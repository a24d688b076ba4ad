//! Common repository record.

use crate::gitlab::Project;
use serde::Serialize;

/// Repository metadata in the shape shared by every repository source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRecord {
    /// Path including namespace (e.g., "acme/widgets").
    pub full_name: String,

    /// Repository name.
    pub name: String,

    /// Repository description.
    pub description: Option<String>,

    /// Number of open issues.
    pub open_issue_count: u64,

    /// Canonical web URL.
    pub url: String,
}

impl From<Project> for RepositoryRecord {
    fn from(project: Project) -> Self {
        Self {
            full_name: project.path_with_namespace,
            name: project.name,
            description: project.description,
            open_issue_count: project.open_issues_count.unwrap_or(0),
            url: project.web_url,
        }
    }
}
