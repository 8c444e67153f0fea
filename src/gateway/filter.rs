//! # Gateway Filter
//!
//! Decides which directory entries are worth collecting auth configs from.
//!
//! A gateway is eligible when it is `Running`, has registered a base URL, and
//! (when a name filter is set) its usable name starts with the filter.

use tracing::debug;

use super::types::{GatewayIdentity, GatewayStatus};
use crate::constants::DEFAULT_CLUSTER_PLACEHOLDER;

/// Resolve the name a gateway is displayed and filtered by
///
/// 1. the display name, if non-empty
/// 2. the last `/`-separated segment of the cluster name, unless it is empty
///    or the `defaultCluster` placeholder
/// 3. the raw cluster name
#[must_use]
pub fn usable_name(gateway: &GatewayIdentity) -> &str {
    if let Some(display_name) = gateway.display_name.as_deref().filter(|n| !n.is_empty()) {
        return display_name;
    }

    let cluster_name = gateway.cluster_name.as_str();
    let leaf = cluster_name.rsplit('/').next().unwrap_or(cluster_name);
    if leaf.is_empty() || leaf == DEFAULT_CLUSTER_PLACEHOLDER {
        cluster_name
    } else {
        leaf
    }
}

/// Decide whether a directory entry is eligible for auth-config collection
///
/// Pure and deterministic; missing fields make the entry ineligible.
#[must_use]
pub fn is_eligible(gateway: &GatewayIdentity, name_filter: &str) -> bool {
    let name = usable_name(gateway);

    if gateway.status != GatewayStatus::Running {
        debug!(gateway = name, status = %gateway.status, "Skipping gateway: not running");
        return false;
    }

    if gateway.cluster_url.as_deref().is_none_or(str::is_empty) {
        debug!(gateway = name, "Skipping gateway: cluster URL is not set");
        return false;
    }

    if !name_filter.is_empty() && !name.starts_with(name_filter) {
        debug!(
            gateway = name,
            filter = name_filter,
            "Skipping gateway: name filter does not match"
        );
        return false;
    }

    debug!(gateway = name, "Gateway is eligible for auth config collection");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(
        cluster_name: &str,
        display_name: Option<&str>,
        status: GatewayStatus,
        cluster_url: Option<&str>,
    ) -> GatewayIdentity {
        GatewayIdentity {
            cluster_name: cluster_name.to_string(),
            display_name: display_name.map(str::to_string),
            status,
            cluster_url: cluster_url.map(str::to_string),
        }
    }

    fn running(cluster_name: &str, display_name: Option<&str>) -> GatewayIdentity {
        gateway(
            cluster_name,
            display_name,
            GatewayStatus::Running,
            Some("https://gw.example.com:8000"),
        )
    }

    #[test]
    fn test_usable_name_prefers_display_name() {
        let gw = running("org/team/shard-3", Some("Prod-EU"));
        assert_eq!(usable_name(&gw), "Prod-EU");
    }

    #[test]
    fn test_usable_name_keeps_full_name_for_default_cluster() {
        let gw = running("org/team/defaultCluster", Some(""));
        assert_eq!(usable_name(&gw), "org/team/defaultCluster");
    }

    #[test]
    fn test_usable_name_strips_path_prefix() {
        let gw = running("org/team/shard-3", None);
        assert_eq!(usable_name(&gw), "shard-3");
    }

    #[test]
    fn test_usable_name_without_slash() {
        let gw = running("standalone", None);
        assert_eq!(usable_name(&gw), "standalone");
    }

    #[test]
    fn test_usable_name_trailing_slash_falls_back_to_raw() {
        let gw = running("org/team/", None);
        assert_eq!(usable_name(&gw), "org/team/");
    }

    #[test]
    fn test_running_with_url_is_eligible_without_filter() {
        assert!(is_eligible(&running("org/team/shard-3", None), ""));
    }

    #[test]
    fn test_not_running_is_never_eligible() {
        for status in [
            GatewayStatus::Unknown,
            GatewayStatus::Other("Stopped".to_string()),
            GatewayStatus::Other("running".to_string()),
        ] {
            let gw = gateway(
                "org/team/shard-3",
                Some("Prod-EU"),
                status,
                Some("https://gw.example.com"),
            );
            assert!(!is_eligible(&gw, ""));
            assert!(!is_eligible(&gw, "Prod"));
        }
    }

    #[test]
    fn test_missing_or_empty_url_is_ineligible() {
        let no_url = gateway("a/b", None, GatewayStatus::Running, None);
        assert!(!is_eligible(&no_url, ""));

        let empty_url = gateway("a/b", None, GatewayStatus::Running, Some(""));
        assert!(!is_eligible(&empty_url, ""));
    }

    #[test]
    fn test_name_filter_is_case_sensitive_prefix() {
        let gw = running("org/team/shard-3", Some("Prod-EU"));
        assert!(is_eligible(&gw, "Prod"));
        assert!(is_eligible(&gw, "Prod-EU"));
        assert!(!is_eligible(&gw, "prod"));
        assert!(!is_eligible(&gw, "EU"));
    }

    #[test]
    fn test_name_filter_applies_to_stripped_cluster_name() {
        let gw = running("org/team/shard-3", None);
        assert!(is_eligible(&gw, "shard"));
        assert!(!is_eligible(&gw, "org/"));

        let default_gw = running("org/team/defaultCluster", None);
        assert!(is_eligible(&default_gw, "org/"));
    }

    #[test]
    fn test_eligibility_is_deterministic() {
        let gw = running("org/team/shard-3", Some("Prod-EU"));
        let first = is_eligible(&gw, "Prod");
        for _ in 0..5 {
            assert_eq!(is_eligible(&gw, "Prod"), first);
        }
    }
}
