//! # Auth Config Fetcher
//!
//! Collects the Kubernetes auth method configurations registered on one gateway.
//!
//! Unlike the directory listing, a failure here never aborts the run. The
//! result is a [`FetchOutcome`] that keeps "nothing registered" and "could not
//! ask" apart for logging; both collapse to the same empty list.

use async_trait::async_trait;
use tracing::debug;

use super::client::GatewayClient;
use super::error::{GatewayFetchError, RequestFailureReason};
use super::types::{GatewayIdentity, KubeAuthConfig, KubeAuthConfigList};
use crate::http::body_excerpt;
use crate::reconcile::AuthConfigSource;

/// Result of collecting auth configs from a single gateway
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one config was returned
    Configs(Vec<KubeAuthConfig>),
    /// The gateway answered but has no Kubernetes auth methods
    Empty,
    /// The gateway could not be queried; logged and skipped
    Failed(GatewayFetchError),
}

impl FetchOutcome {
    /// Wrap a decoded list, mapping an empty list to [`FetchOutcome::Empty`]
    #[must_use]
    pub fn from_configs(configs: Vec<KubeAuthConfig>) -> Self {
        if configs.is_empty() {
            Self::Empty
        } else {
            Self::Configs(configs)
        }
    }

    /// Collapse to the configs, treating `Empty` and `Failed` identically
    #[must_use]
    pub fn into_configs(self) -> Vec<KubeAuthConfig> {
        match self {
            Self::Configs(configs) => configs,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }
}

impl GatewayClient {
    /// Fetch every Kubernetes auth config registered on `gateway`
    ///
    /// Issues one `GET <cluster_url>/config/k8s-auths` authenticated with the
    /// run's access token.
    pub async fn fetch_auth_configs(&self, gateway: &GatewayIdentity) -> FetchOutcome {
        let name = gateway.usable_name();

        let Some(base_url) = gateway.cluster_url.as_deref().filter(|u| !u.is_empty()) else {
            debug!("Gateway '{}' has no cluster URL, nothing to fetch", name);
            return FetchOutcome::Empty;
        };

        let url = paths::join(base_url, paths::gateway::K8S_AUTHS);
        debug!("Cluster URL with k8s auth path: {}", url);

        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(self.token.expose())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return FetchOutcome::Failed(GatewayFetchError::new(
                    name,
                    RequestFailureReason::from_reqwest(&e),
                    e.to_string(),
                ))
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return FetchOutcome::Failed(GatewayFetchError::new(
                    name,
                    RequestFailureReason::from_reqwest(&e),
                    e.to_string(),
                ))
            }
        };

        if !status.is_success() {
            return FetchOutcome::Failed(GatewayFetchError::new(
                name,
                RequestFailureReason::HttpStatus,
                format!("{status}: {}", body_excerpt(&body)),
            ));
        }

        match serde_json::from_str::<KubeAuthConfigList>(&body) {
            Ok(list) => {
                debug!(
                    "Gateway '{}' returned {} k8s auth config(s): {:?}",
                    name,
                    list.k8s_auths.len(),
                    list.k8s_auths.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
                );
                FetchOutcome::from_configs(list.k8s_auths)
            }
            Err(e) => FetchOutcome::Failed(GatewayFetchError::new(
                name,
                RequestFailureReason::Decode,
                format!("invalid k8s auth config payload: {e}"),
            )),
        }
    }
}

#[async_trait]
impl AuthConfigSource for GatewayClient {
    async fn fetch(&self, gateway: &GatewayIdentity) -> FetchOutcome {
        self.fetch_auth_configs(gateway).await
    }
}
