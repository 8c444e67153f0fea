//! # Reconciliation Pipeline
//!
//! Drives one diagnostic run end to end:
//!
//! 1. list the gateway directory (fatal on failure)
//! 2. aggregate auth configs from eligible gateways
//! 3. match them against the local cluster
//! 4. submit a TokenReview for every match
//!
//! Everything runs sequentially; the only accumulated state is the aggregate
//! returned by step 2.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::aggregate::{aggregate, AuthConfigSource};
use super::matcher::{match_clusters, ClusterMatch};
use crate::config::RunConfig;
use crate::gateway::{GatewayAuthConfigs, GatewayClient, GatewayIdentity, KubeAuthConfig};
use crate::local_cluster::LocalClusterIdentity;
use crate::token_review::{TokenReviewOutcome, TokenReviewer};

/// Validates the reviewer credential of a matched auth config
///
/// Implemented by [`TokenReviewer`]; tests substitute canned outcomes.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, config: &KubeAuthConfig) -> TokenReviewOutcome;
}

/// A cluster match together with its TokenReview result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedMatch {
    #[serde(flatten)]
    pub cluster_match: ClusterMatch,
    pub token_review: TokenReviewOutcome,
}

/// Per-gateway collection summary for the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedGateway {
    pub name: String,
    pub cluster_url: Option<String>,
    pub config_count: usize,
}

impl From<&GatewayAuthConfigs> for CollectedGateway {
    fn from(entry: &GatewayAuthConfigs) -> Self {
        Self {
            name: entry.gateway.usable_name().to_string(),
            cluster_url: entry.gateway.cluster_url.clone(),
            config_count: entry.configs.len(),
        }
    }
}

/// Result of a completed run
///
/// A run without matches is still a successful diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub checked_at: DateTime<Utc>,
    pub cluster: LocalClusterIdentity,
    pub gateway_name_filter: String,
    pub gateways_listed: usize,
    pub gateways_collected: Vec<CollectedGateway>,
    pub matches: Vec<ValidatedMatch>,
}

impl Diagnosis {
    /// At least one gateway has an auth config for the local cluster
    #[must_use]
    pub fn has_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Submit a TokenReview for each match, in order
pub async fn validate_matches<V>(matches: Vec<ClusterMatch>, validator: &V) -> Vec<ValidatedMatch>
where
    V: CredentialValidator + ?Sized,
{
    let mut validated = Vec::with_capacity(matches.len());
    for cluster_match in matches {
        let token_review = validator.validate(&cluster_match.config).await;
        info!(
            "Token reviewer JWT for config '{}' authenticated: {}",
            cluster_match.config.name, token_review.authenticated
        );
        validated.push(ValidatedMatch {
            cluster_match,
            token_review,
        });
    }
    validated
}

/// Aggregate, match and validate against an already listed directory
pub async fn reconcile<S, V>(
    directory: &[GatewayIdentity],
    name_filter: &str,
    local: &LocalClusterIdentity,
    source: &S,
    validator: &V,
) -> (Vec<GatewayAuthConfigs>, Vec<ValidatedMatch>)
where
    S: AuthConfigSource + ?Sized,
    V: CredentialValidator + ?Sized,
{
    let collected = aggregate(directory, name_filter, source).await;
    let matches = match_clusters(&collected, &local.server, &local.ca_base64);
    if matches.is_empty() {
        info!(
            "No gateway has a k8s auth config for cluster {}",
            local.server
        );
    }
    let validated = validate_matches(matches, validator).await;
    (collected, validated)
}

/// Run the full diagnosis for `config` against the local cluster
///
/// # Errors
/// Only precondition failures: the HTTP clients cannot be built or the gateway
/// directory is unavailable ([`crate::gateway::DirectoryError`]).
pub async fn diagnose(config: &RunConfig, local: LocalClusterIdentity) -> Result<Diagnosis> {
    let gateway_client = GatewayClient::new(&config.api_url, config.token.clone(), config.timeout)?;
    let token_reviewer = TokenReviewer::new(config.timeout)?;

    let directory = gateway_client
        .list_gateways()
        .await
        .context("Unable to retrieve the list of gateways with the provided token")?;

    let (collected, matches) = reconcile(
        &directory,
        &config.gateway_name_filter,
        &local,
        &gateway_client,
        &token_reviewer,
    )
    .await;

    Ok(Diagnosis {
        checked_at: Utc::now(),
        cluster: local,
        gateway_name_filter: config.gateway_name_filter.clone(),
        gateways_listed: directory.len(),
        gateways_collected: collected.iter().map(CollectedGateway::from).collect(),
        matches,
    })
}
