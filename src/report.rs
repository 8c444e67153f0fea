//! # Reporter
//!
//! Renders a [`Diagnosis`] for the operator, as plain text or JSON.
//!
//! "No match", "CA mismatch" and "not authenticated" are findings, reported
//! alongside each other; none of them is an error.

use std::fmt;

use crate::reconcile::{Diagnosis, ValidatedMatch};

/// Human-readable report
#[derive(Debug)]
pub struct TextReport<'a> {
    diagnosis: &'a Diagnosis,
    verbose: bool,
}

impl<'a> TextReport<'a> {
    #[must_use]
    pub fn new(diagnosis: &'a Diagnosis, verbose: bool) -> Self {
        Self { diagnosis, verbose }
    }

    fn write_match(f: &mut fmt::Formatter<'_>, validated: &ValidatedMatch) -> fmt::Result {
        let cluster_match = &validated.cluster_match;
        let config = &cluster_match.config;
        let review = &validated.token_review;

        writeln!(f, "Found matching K8S Auth Config for cluster: {}", config.k8s_host)?;
        writeln!(
            f,
            "  Gateway: {} ({})",
            cluster_match.gateway.usable_name(),
            cluster_match.gateway.cluster_url.as_deref().unwrap_or("-")
        )?;
        writeln!(f, "  K8S Auth Config Name: {}", config.name)?;
        writeln!(f, "  K8S Auth Config Access ID: {}", config.auth_method_access_id)?;

        if cluster_match.ca_matches {
            writeln!(f, "  CA Cert: matches the local cluster CA")?;
        } else {
            writeln!(f, "  CA Cert: does NOT match the local cluster CA")?;
        }

        if review.authenticated {
            writeln!(
                f,
                "  Token Reviewer JWT: valid for user {}",
                review.username.as_deref().unwrap_or("<unknown>")
            )?;
        } else {
            writeln!(f, "  Token Reviewer JWT: NOT valid")?;
            if let Some(reason) = &review.denial_reason {
                writeln!(f, "    Reason: {reason}")?;
            }
            if let Some(error) = &review.error {
                writeln!(f, "    Error: {error}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.diagnosis;
        let cluster = &d.cluster;

        if !cluster.kubeconfig_paths.is_empty() {
            let paths: Vec<String> = cluster
                .kubeconfig_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            writeln!(f, "Kubeconfig path: {}", paths.join(", "))?;
        }
        writeln!(f, "Current context: {}", cluster.context)?;
        writeln!(f, "Cluster: {}", cluster.cluster_name)?;
        writeln!(f, "User: {}", cluster.user.as_deref().unwrap_or("-"))?;
        writeln!(f, "Namespace: {}", cluster.namespace.as_deref().unwrap_or("-"))?;
        writeln!(f, "Kubernetes cluster endpoint URL: {}", cluster.server)?;
        if self.verbose {
            writeln!(f, "Certificate authority data: {}", cluster.ca_base64)?;
        }

        writeln!(f)?;
        if !d.gateway_name_filter.is_empty() {
            writeln!(f, "Gateway name filter: {}", d.gateway_name_filter)?;
        }
        writeln!(
            f,
            "Gateways listed: {}, with k8s auth configs: {}",
            d.gateways_listed,
            d.gateways_collected.len()
        )?;
        if self.verbose {
            for gateway in &d.gateways_collected {
                writeln!(
                    f,
                    "  {} ({}): {} config(s)",
                    gateway.name,
                    gateway.cluster_url.as_deref().unwrap_or("-"),
                    gateway.config_count
                )?;
            }
        }
        writeln!(f)?;

        if !d.has_match() {
            return writeln!(
                f,
                "No gateway has a K8S Auth Config for cluster: {}",
                cluster.server
            );
        }

        for (i, validated) in d.matches.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            Self::write_match(f, validated)?;
        }

        Ok(())
    }
}

/// Machine-readable report; secrets are never serialized
///
/// # Errors
/// Serialization failure.
pub fn render_json(diagnosis: &Diagnosis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(diagnosis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayIdentity, GatewayStatus, KubeAuthConfig, SecretString};
    use crate::local_cluster::LocalClusterIdentity;
    use crate::reconcile::{ClusterMatch, CollectedGateway};
    use crate::token_review::TokenReviewOutcome;
    use chrono::Utc;
    use std::path::PathBuf;

    fn diagnosis(matches: Vec<ValidatedMatch>) -> Diagnosis {
        Diagnosis {
            checked_at: Utc::now(),
            cluster: LocalClusterIdentity {
                kubeconfig_paths: vec![PathBuf::from("/home/op/.kube/config")],
                user: Some("kind-admin".to_string()),
                ..LocalClusterIdentity::new(
                    "kind-dev",
                    "kind-dev",
                    Some("akeyless".to_string()),
                    "https://127.0.0.1:6443",
                    b"ca".to_vec(),
                )
            },
            gateway_name_filter: String::new(),
            gateways_listed: 2,
            gateways_collected: vec![CollectedGateway {
                name: "gw-eu".to_string(),
                cluster_url: Some("https://gw-eu.example.com".to_string()),
                config_count: 1,
            }],
            matches,
        }
    }

    fn validated(ca_matches: bool, review: TokenReviewOutcome) -> ValidatedMatch {
        ValidatedMatch {
            cluster_match: ClusterMatch {
                gateway: GatewayIdentity {
                    cluster_name: "acc/p/gw-eu".to_string(),
                    display_name: None,
                    status: GatewayStatus::Running,
                    cluster_url: Some("https://gw-eu.example.com".to_string()),
                },
                config: KubeAuthConfig {
                    name: "k8s-conf".to_string(),
                    auth_method_access_id: "p-abc123".to_string(),
                    k8s_host: "https://127.0.0.1:6443".to_string(),
                    k8s_token_reviewer_jwt: SecretString::new("reviewer-jwt-value"),
                    ..Default::default()
                },
                ca_matches,
            },
            token_review: review,
        }
    }

    #[test]
    fn test_no_match_report() {
        let text = TextReport::new(&diagnosis(Vec::new()), false).to_string();
        assert!(text.contains("Kubeconfig path: /home/op/.kube/config"));
        assert!(text.contains("Current context: kind-dev"));
        assert!(text.contains("User: kind-admin"));
        assert!(text.contains("Gateways listed: 2, with k8s auth configs: 1"));
        assert!(text.contains("No gateway has a K8S Auth Config for cluster: https://127.0.0.1:6443"));
        assert!(!text.contains("Certificate authority data"));
    }

    #[test]
    fn test_valid_match_report() {
        let review = TokenReviewOutcome {
            authenticated: true,
            username: Some("system:serviceaccount:akeyless:reviewer".to_string()),
            ..Default::default()
        };
        let text = TextReport::new(&diagnosis(vec![validated(true, review)]), true).to_string();

        assert!(text.contains("Found matching K8S Auth Config for cluster: https://127.0.0.1:6443"));
        assert!(text.contains("Gateway: gw-eu (https://gw-eu.example.com)"));
        assert!(text.contains("K8S Auth Config Access ID: p-abc123"));
        assert!(text.contains("CA Cert: matches the local cluster CA"));
        assert!(text.contains("valid for user system:serviceaccount:akeyless:reviewer"));
        assert!(text.contains("Certificate authority data: Y2E="));
        assert!(text.contains("gw-eu (https://gw-eu.example.com): 1 config(s)"));
    }

    #[test]
    fn test_invalid_match_report() {
        let review = TokenReviewOutcome::failed("401 Unauthorized: Unauthorized");
        let text = TextReport::new(&diagnosis(vec![validated(false, review)]), false).to_string();

        assert!(text.contains("CA Cert: does NOT match the local cluster CA"));
        assert!(text.contains("Token Reviewer JWT: NOT valid"));
        assert!(text.contains("Error: 401 Unauthorized: Unauthorized"));
    }

    #[test]
    fn test_json_report_omits_secrets() {
        let review = TokenReviewOutcome {
            authenticated: true,
            username: Some("u".to_string()),
            ..Default::default()
        };
        let json = render_json(&diagnosis(vec![validated(true, review)])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["matches"][0]["ca_matches"], true);
        assert_eq!(value["matches"][0]["config"]["name"], "k8s-conf");
        assert_eq!(value["matches"][0]["token_review"]["authenticated"], true);
        assert_eq!(value["cluster"]["server"], "https://127.0.0.1:6443");
        assert_eq!(value["cluster"]["user"], "kind-admin");
        assert_eq!(value["cluster"]["kubeconfig_paths"][0], "/home/op/.kube/config");
        assert!(!json.contains("reviewer-jwt-value"));
    }
}
