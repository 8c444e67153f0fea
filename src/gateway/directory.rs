//! # Gateway Directory
//!
//! Lists every gateway cluster the control plane knows about for the access token.
//!
//! One attempt per run: any failure is returned immediately as a
//! [`DirectoryError`] and the caller aborts, since filtering by name is only
//! meaningful over the full directory.

use tracing::{debug, info};

use super::client::GatewayClient;
use super::error::{DirectoryError, RequestFailureReason};
use super::types::{GatewayIdentity, GatewayList, ListGatewaysRequest};
use crate::http::body_excerpt;

impl GatewayClient {
    /// Retrieve the full, unfiltered gateway directory in control-plane order
    ///
    /// # Errors
    /// Transport failure, a non-success status or an undecodable payload.
    pub async fn list_gateways(&self) -> Result<Vec<GatewayIdentity>, DirectoryError> {
        let url = paths::join(&self.api_url, paths::control_plane::LIST_GATEWAYS);
        debug!("Listing gateways: POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&ListGatewaysRequest {
                token: self.token.expose(),
            })
            .send()
            .await
            .map_err(|e| {
                DirectoryError::new(RequestFailureReason::from_reqwest(&e), e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DirectoryError::new(RequestFailureReason::from_reqwest(&e), e.to_string())
                .with_status(status.as_u16())
        })?;

        if !status.is_success() {
            return Err(DirectoryError::new(
                RequestFailureReason::HttpStatus,
                format!("{status}: {}", body_excerpt(&body)),
            )
            .with_status(status.as_u16()));
        }

        let list: GatewayList = serde_json::from_str(&body).map_err(|e| {
            DirectoryError::new(
                RequestFailureReason::Decode,
                format!("invalid gateway list payload: {e}"),
            )
            .with_status(status.as_u16())
        })?;

        info!("Control plane listed {} gateway cluster(s)", list.clusters.len());
        Ok(list.clusters)
    }
}
