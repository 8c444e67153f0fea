//! # Token Review
//!
//! Checks that the reviewer JWT recorded in a matched auth config is still
//! accepted by the cluster, using the Kubernetes TokenReview API.
//!
//! The request is `POST <k8s_host>/apis/authentication.k8s.io/v1/tokenreviews`
//! with the reviewer JWT both as the reviewed token and as the bearer
//! credential. Certificate verification is disabled for this client only: the
//! cluster CA is the very thing being diagnosed.
//!
//! A rejected or failed review is a diagnostic result, never an error.

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{TokenReview, TokenReviewSpec, TokenReviewStatus};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::gateway::KubeAuthConfig;
use crate::http::{body_excerpt, insecure_client};
use crate::reconcile::CredentialValidator;

/// Interpretation of one TokenReview call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenReviewOutcome {
    /// The API server authenticated the reviewer JWT
    pub authenticated: bool,
    /// Identity the token resolved to, e.g. `system:serviceaccount:ns:sa`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// `status.error` reported by the API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    /// The call itself failed (transport, HTTP status or payload)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenReviewOutcome {
    /// Outcome for a call that produced no usable review
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Interpret the `status` block of a TokenReview response
    ///
    /// A missing status or a missing `authenticated` flag means not authenticated.
    #[must_use]
    pub fn from_status(status: Option<TokenReviewStatus>) -> Self {
        let Some(status) = status else {
            return Self::default();
        };

        let user = status.user.unwrap_or_default();
        Self {
            authenticated: status.authenticated.unwrap_or(false),
            username: user.username.filter(|u| !u.is_empty()),
            groups: user.groups.unwrap_or_default(),
            denial_reason: status.error.filter(|e| !e.is_empty()),
            error: None,
        }
    }
}

/// TokenReview response envelope; only the status block is read
#[derive(Debug, Deserialize)]
struct TokenReviewResponse {
    #[serde(default)]
    status: Option<TokenReviewStatus>,
}

/// Build the TokenReview object submitted for `token`
#[must_use]
pub fn token_review_request(token: &str) -> TokenReview {
    TokenReview {
        spec: TokenReviewSpec {
            token: Some(token.to_string()),
            ..TokenReviewSpec::default()
        },
        ..TokenReview::default()
    }
}

/// Extract a readable message from a non-success API server response
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body_excerpt(body))
}

/// Client that submits TokenReviews to arbitrary clusters
pub struct TokenReviewer {
    http_client: Client,
}

impl std::fmt::Debug for TokenReviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenReviewer").finish_non_exhaustive()
    }
}

impl TokenReviewer {
    /// Create a token reviewer whose requests are bounded by `timeout`
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: insecure_client(timeout)?,
        })
    }

    /// Review the reviewer JWT recorded in `config` against `config.k8s_host`
    pub async fn review(&self, config: &KubeAuthConfig) -> TokenReviewOutcome {
        let url = paths::join(&config.k8s_host, paths::kubernetes::TOKEN_REVIEWS);
        let jwt = config.k8s_token_reviewer_jwt.expose();
        debug!("Submitting TokenReview for config '{}': POST {}", config.name, url);

        let response = match self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(jwt)
            .json(&token_review_request(jwt))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("TokenReview request for config '{}' failed: {}", config.name, e);
                return TokenReviewOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    "Failed to read TokenReview response for config '{}': {}",
                    config.name, e
                );
                return TokenReviewOutcome::failed(e.to_string());
            }
        };

        if !status.is_success() {
            let message = api_error_message(&body);
            info!(
                "TokenReview for config '{}' rejected with {}: {}",
                config.name, status, message
            );
            return TokenReviewOutcome::failed(format!("{status}: {message}"));
        }

        match serde_json::from_str::<TokenReviewResponse>(&body) {
            Ok(review) => TokenReviewOutcome::from_status(review.status),
            Err(e) => {
                warn!(
                    "Invalid TokenReview response for config '{}': {}",
                    config.name, e
                );
                TokenReviewOutcome::failed(format!("invalid TokenReview response: {e}"))
            }
        }
    }
}

#[async_trait]
impl CredentialValidator for TokenReviewer {
    async fn validate(&self, config: &KubeAuthConfig) -> TokenReviewOutcome {
        self.review(config).await
    }
}
