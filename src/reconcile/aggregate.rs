//! # Aggregator
//!
//! Walks the gateway directory in order, applies the eligibility filter and
//! collects auth configs from each eligible gateway.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::gateway::{is_eligible, FetchOutcome, GatewayAuthConfigs, GatewayIdentity};

/// Source of a gateway's Kubernetes auth configs
///
/// Implemented by [`crate::gateway::GatewayClient`]; tests substitute canned outcomes.
#[async_trait]
pub trait AuthConfigSource: Send + Sync {
    async fn fetch(&self, gateway: &GatewayIdentity) -> FetchOutcome;
}

/// Collect auth configs from every eligible gateway, in directory order
///
/// Gateways that yield no configs, whether because none are registered or
/// because the fetch failed, are left out. Repeated directory entries are not
/// deduplicated.
pub async fn aggregate<S>(
    directory: &[GatewayIdentity],
    name_filter: &str,
    source: &S,
) -> Vec<GatewayAuthConfigs>
where
    S: AuthConfigSource + ?Sized,
{
    if !name_filter.is_empty() {
        info!("Gateway name filter: {}", name_filter);
    }

    let mut collected = Vec::new();

    for gateway in directory {
        if !is_eligible(gateway, name_filter) {
            continue;
        }

        let name = gateway.usable_name();
        match source.fetch(gateway).await {
            FetchOutcome::Configs(configs) => {
                info!(
                    "Collected {} k8s auth config(s) from gateway '{}'",
                    configs.len(),
                    name
                );
                collected.push(GatewayAuthConfigs {
                    gateway: gateway.clone(),
                    configs,
                });
            }
            FetchOutcome::Empty => {
                debug!("Gateway '{}' has no k8s auth configs", name);
            }
            FetchOutcome::Failed(e) => {
                warn!("Skipping gateway '{}': {}", name, e);
            }
        }
    }

    info!(
        "Collected k8s auth configs from {} of {} gateway cluster(s)",
        collected.len(),
        directory.len()
    );
    collected
}
