//! GitLab REST (v4) client.

use crate::gitlab::{ClientFactory, GitLabError, Project, ProjectClient};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

/// Header GitLab reads personal access tokens from (`PRIVATE-TOKEN`).
const TOKEN_HEADER: &str = "private-token";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds [`RestClient`]s for any instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct RestClientFactory;

impl RestClientFactory {
    /// Creates a new factory.
    pub fn new() -> Self {
        Self
    }
}

impl ClientFactory for RestClientFactory {
    fn connect(&self, base_url: &str, token: &str) -> Result<Box<dyn ProjectClient>, GitLabError> {
        Ok(Box::new(RestClient::new(base_url, token)?))
    }
}

/// A GitLab API client scoped to one instance and authenticated by token.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: Url,
    http: reqwest::Client,
}

impl RestClient {
    /// Creates a client for the instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GitLabError`] if the URL or token is unusable, or the HTTP
    /// client can't be built.
    pub fn new(base_url: &str, token: &str) -> Result<Self, GitLabError> {
        Self::with_builder(base_url, token, reqwest::Client::builder())
    }

    fn with_builder(
        base_url: &str,
        token: &str,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, GitLabError> {
        let base_url = Url::parse(base_url).map_err(|_| GitLabError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GitLabError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let mut token = HeaderValue::from_str(token).map_err(|_| GitLabError::InvalidToken)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let http = builder
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Returns the instance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ProjectClient for RestClient {
    async fn get_project(&self, path: &str) -> Result<Project, GitLabError> {
        let endpoint = project_endpoint(&self.base_url, path)?;
        debug!(%endpoint, "Requesting project");

        let response = self.http.get(endpoint).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitLabError::NotFound {
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitLabError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response.json::<Project>().await?)
    }
}

/// Builds `<base>/api/v4/projects/<path>` with `path` encoded as one segment.
pub(crate) fn project_endpoint(base_url: &Url, path: &str) -> Result<Url, GitLabError> {
    let mut endpoint = base_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| GitLabError::InvalidUrl {
            url: base_url.to_string(),
        })?
        .pop_if_empty()
        .extend(["api", "v4", "projects", path]);
    Ok(endpoint)
}

/// Extracts GitLab's `message` or `error` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed
        .as_ref()
        .and_then(|value| value.get("message").or_else(|| value.get("error")));

    match field {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}
