use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{domain::ProjectId, utils::error_chain_fmt};

pub const PROJECT_ID_PATH: &str = "computeMetadata/v1/project/project-id";
pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub const PROJECT_ID_ENV_VAR: &str = "GOOGLE_CLOUD_PROJECT";

/// Client for the metadata server reachable from inside the cloud runtime.
#[derive(Clone)]
pub struct MetadataClient {
    http_client: Client,
    base_url: String,
}

#[derive(thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to connect to the metadata server.")]
    Unreachable(#[source] reqwest::Error),
    #[error("Timed out waiting for the metadata server.")]
    Timeout(#[source] reqwest::Error),
    #[error("Metadata server returned non-success status {0}.")]
    UnexpectedStatus(StatusCode),
    #[error("Metadata server returned an empty project id.")]
    Empty,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<reqwest::Error> for MetadataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MetadataError::Timeout(e)
        } else if e.is_connect() {
            MetadataError::Unreachable(e)
        } else {
            MetadataError::UnexpectedError(anyhow::Error::new(e))
        }
    }
}

impl MetadataError {
    /// Outside the cloud runtime the server is simply not there.
    pub fn is_expected(&self) -> bool {
        matches!(self, MetadataError::Unreachable(_) | MetadataError::Timeout(_))
    }
}

impl MetadataClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }

    /// Single attempt, no retries.
    #[tracing::instrument(name = "Fetching project id from the metadata server", skip(self))]
    pub async fn project_id(&self) -> Result<ProjectId, MetadataError> {
        let url = format!("{}/{PROJECT_ID_PATH}", self.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .get(url)
            .header(METADATA_FLAVOR_HEADER, "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        ProjectId::parse(&body).ok_or(MetadataError::Empty)
    }
}

/// Resolves the project id, reading the environment for the third source.
pub async fn resolve_project_id(client: &MetadataClient, configured: Option<&str>) -> ProjectId {
    let from_env = std::env::var(PROJECT_ID_ENV_VAR).ok();
    resolve_project_id_from(client, configured, from_env.as_deref()).await
}

/// Tries the metadata server, then configuration, then the environment
/// variable, then gives up with `unknown`. Never fails.
#[tracing::instrument(name = "Resolving GCP project id", skip(client, configured, from_env))]
pub async fn resolve_project_id_from(
    client: &MetadataClient,
    configured: Option<&str>,
    from_env: Option<&str>,
) -> ProjectId {
    tracing::debug!("Attempting to fetch project ID from GCP metadata service");
    match client.project_id().await {
        Ok(project_id) => {
            tracing::info!(%project_id, "Using project ID from GCP metadata service");
            return project_id;
        }
        Err(e) if e.is_expected() => {
            tracing::debug!(
                error.cause_chain = ?e,
                error.message = %e,
                "GCP metadata service unavailable (likely not running in GCP)"
            );
        }
        Err(e) => {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to fetch project ID from GCP metadata service"
            );
        }
    }

    if let Some(project_id) = configured.and_then(ProjectId::parse) {
        tracing::info!(%project_id, "Using project ID from configuration");
        return project_id;
    }

    if let Some(project_id) = from_env.and_then(ProjectId::parse) {
        tracing::info!(%project_id, "Using project ID from environment variable");
        return project_id;
    }

    tracing::warn!("Could not determine GCP project ID from any source, using 'unknown'");
    ProjectId::unknown()
}
