//! Resolution of repository URLs against registered instances.
//!
//! A URI such as `https://gitlab.example.com/acme/widgets` is matched to the
//! instance whose host is `gitlab.example.com`, the instance's credential
//! supplies the access token, and the project `acme/widgets` is fetched and
//! mapped to a [`RepositoryRecord`].

mod error;
mod record;

pub use error::ResolveError;
pub use record::RepositoryRecord;

use crate::credentials::CredentialStore;
use crate::gitlab::ClientFactory;
use crate::instances::{GitLabHost, InstanceRegistry};
use crate::messages::Messenger;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

/// Example path appended to each instance URL in help text.
const EXAMPLE_PATH: &str = "/vendor/name";

/// A registered instance with its compiled URI pattern.
#[derive(Debug)]
struct HostPattern {
    host: GitLabHost,
    pattern: Regex,
}

/// Resolves repository URLs against a snapshot of registered instances.
///
/// Collaborators are supplied at construction. The instance list is fixed
/// for the resolver's lifetime; build a new resolver to see edits.
pub struct GitLabResolver {
    hosts: Vec<HostPattern>,
    credentials: Arc<dyn CredentialStore>,
    clients: Arc<dyn ClientFactory>,
    messenger: Arc<dyn Messenger>,
}

impl GitLabResolver {
    /// Creates a resolver over the instances in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Pattern`] if an instance URL can't be
    /// compiled into a match pattern.
    pub fn new(
        registry: &InstanceRegistry,
        credentials: Arc<dyn CredentialStore>,
        clients: Arc<dyn ClientFactory>,
        messenger: Arc<dyn Messenger>,
    ) -> Result<Self, ResolveError> {
        let hosts = registry
            .hosts()
            .iter()
            .map(|host| {
                let pattern = repository_pattern(&host.url).map_err(|e| ResolveError::Pattern {
                    key: host.key.clone(),
                    source: e,
                })?;
                Ok(HostPattern {
                    host: host.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;

        Ok(Self {
            hosts,
            credentials,
            clients,
            messenger,
        })
    }

    /// Returns true if `uri` points at a repository on any registered instance.
    ///
    /// The URI must start with an instance URL followed by `/vendor/name`.
    /// No network access is made.
    pub fn matches(&self, uri: &str) -> bool {
        self.hosts.iter().any(|entry| entry.pattern.is_match(uri))
    }

    /// Lists the accepted URL shapes, e.g.
    /// `https://a.com/vendor/name; https://b.com/vendor/name`.
    pub fn help_text(&self) -> String {
        self.hosts
            .iter()
            .map(|entry| format!("{}{EXAMPLE_PATH}", entry.host.url))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Fetches repository metadata for `uri`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the URI names no repository on a registered instance,
    /// or when the GitLab request fails. A failed request also adds one
    /// status message to the messenger.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the matched instance has no usable
    /// credential or its client can't be built.
    pub async fn fetch(&self, uri: &str) -> Result<Option<RepositoryRecord>, ResolveError> {
        let Some(target) = RepositoryPath::parse(uri) else {
            debug!(uri, "URI does not name a repository");
            return Ok(None);
        };

        let Some(instance) = self.instance_for(&target.host) else {
            debug!(uri, host = %target.host, "No registered instance for host");
            return Ok(None);
        };

        let project_path = target.project_path();
        let span = info_span!(
            "fetch_repository",
            instance = %instance.key,
            project = %project_path
        );

        async {
            let credential = self.credentials.get_credential(&instance.key).ok_or_else(|| {
                ResolveError::MissingCredential {
                    key: instance.key.clone(),
                }
            })?;
            let token =
                credential
                    .personal_access_token()
                    .ok_or_else(|| ResolveError::MissingToken {
                        key: instance.key.clone(),
                    })?;

            let client = self
                .clients
                .connect(&instance.url, token)
                .map_err(|e| ResolveError::Client {
                    key: instance.key.clone(),
                    source: e,
                })?;

            match client.get_project(&project_path).await {
                Ok(project) => {
                    info!("Fetched repository");
                    Ok(Some(RepositoryRecord::from(project)))
                }
                Err(e) => {
                    warn!(error = %e, "GitLab request failed");
                    self.messenger.add_status(format!("GitLab error: {e}"));
                    Ok(None)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Returns the registered instances in match order.
    pub fn hosts(&self) -> impl Iterator<Item = &GitLabHost> {
        self.hosts.iter().map(|entry| &entry.host)
    }

    /// First registered instance for `host`.
    fn instance_for(&self, host: &str) -> Option<&GitLabHost> {
        self.hosts()
            .find(|instance| instance.host.eq_ignore_ascii_case(host))
    }
}

/// Builds `^<url>/<vendor>/<name>`, matched as a prefix.
fn repository_pattern(url: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "^{}/[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+",
        regex::escape(url)
    ))
}

/// Host and project path taken from a repository URI.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RepositoryPath {
    host: String,
    vendor: String,
    name: String,
}

impl RepositoryPath {
    /// Reads the host and the first two non-empty path segments.
    /// Anything past the second segment is ignored.
    fn parse(uri: &str) -> Option<Self> {
        let url = Url::parse(uri).ok()?;
        let host = url.host_str()?.to_string();
        let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
        let vendor = segments.next()?.to_string();
        let name = segments.next()?.to_string();

        Some(Self { host, vendor, name })
    }

    fn project_path(&self) -> String {
        format!("{}/{}", self.vendor, self.name)
    }
}
