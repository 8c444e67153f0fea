//! # Gateway Client
//!
//! HTTP client used for the control-plane directory and every gateway's
//! auth-config listing. Certificates are verified.

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::types::SecretString;
use crate::http::verifying_client;

/// Client for the control plane and the gateways it lists
///
/// One instance is built per run and reused for every call.
pub struct GatewayClient {
    pub(crate) http_client: Client,
    pub(crate) api_url: String,
    pub(crate) token: SecretString,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    /// - `api_url`: control-plane base URL
    /// - `token`: access token sent to the control plane and to every gateway
    /// - `timeout`: bound for each individual request
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn new(api_url: &str, token: SecretString, timeout: Duration) -> Result<Self> {
        let api_url = api_url.trim_end_matches('/').to_string();
        info!("Control plane endpoint: {}", api_url);

        Ok(Self {
            http_client: verifying_client(timeout)?,
            api_url,
            token,
        })
    }
}
