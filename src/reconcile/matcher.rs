//! # Cluster Matcher
//!
//! Finds the auth configs that were registered for the local cluster.
//!
//! Matching is exact string equality on the Kubernetes host, and the CA check
//! is exact equality on the base64 text. URLs are not canonicalized and
//! certificates are not parsed.

use serde::Serialize;
use tracing::{debug, info};

use crate::gateway::{GatewayAuthConfigs, GatewayIdentity, KubeAuthConfig};

/// An auth config whose recorded host is the local cluster's host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMatch {
    pub gateway: GatewayIdentity,
    pub config: KubeAuthConfig,
    /// Recorded CA equals the local cluster's base64 CA
    pub ca_matches: bool,
}

/// Match every collected config against the local cluster host
///
/// Returns matches in aggregate traversal order. An empty result means no
/// gateway is configured to trust this cluster.
#[must_use]
pub fn match_clusters(
    aggregate: &[GatewayAuthConfigs],
    local_host: &str,
    local_ca_base64: &str,
) -> Vec<ClusterMatch> {
    let mut matches = Vec::new();

    for entry in aggregate {
        for config in &entry.configs {
            if config.k8s_host != local_host {
                debug!(
                    "Config '{}' on gateway '{}' targets {}, not the local cluster",
                    config.name,
                    entry.gateway.usable_name(),
                    config.k8s_host
                );
                continue;
            }

            let ca_matches = config.k8s_ca_cert == local_ca_base64;
            info!(
                "Found matching k8s auth config '{}' (access id {}) on gateway '{}', CA match: {}",
                config.name,
                config.auth_method_access_id,
                entry.gateway.usable_name(),
                ca_matches
            );

            matches.push(ClusterMatch {
                gateway: entry.gateway.clone(),
                config: config.clone(),
                ca_matches,
            });
        }
    }

    matches
}
