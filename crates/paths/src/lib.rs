//! Shared API path definitions for the control plane, gateways and Kubernetes
//!
//! This crate centralizes all API paths to ensure consistency
//! between the reconciler clients and the mock gateway implementation.
//!
//! ## Route Constants
//!
//! Route constants are provided for Axum routes, which require static string literals.
//! [`join`] builds the full request URL from a base URL and one of these routes.

/// Control-plane (directory) API paths
pub mod control_plane {
    /// Lists every gateway cluster known to the account behind the access token.
    ///
    /// `POST` with a JSON body `{"token": "..."}`.
    pub const LIST_GATEWAYS: &str = "/list-gateways";
}

/// Paths served by an individual gateway cluster
pub mod gateway {
    /// Lists the Kubernetes auth method configurations registered on the gateway.
    ///
    /// `GET` with `Authorization: Bearer <token>`.
    pub const K8S_AUTHS: &str = "/config/k8s-auths";
}

/// Kubernetes API server paths
pub mod kubernetes {
    /// TokenReview API group version
    pub const AUTHENTICATION_API_VERSION: &str = "authentication.k8s.io/v1";

    /// TokenReview kind
    pub const TOKEN_REVIEW_KIND: &str = "TokenReview";

    /// `POST` a TokenReview object to validate a bearer token.
    pub const TOKEN_REVIEWS: &str = "/apis/authentication.k8s.io/v1/tokenreviews";
}

/// Append a route to a base URL
///
/// The base URL is used exactly as configured except that trailing slashes are
/// dropped, so `https://gw.example.com/` and `https://gw.example.com` both
/// produce `https://gw.example.com/config/k8s-auths`.
#[must_use]
pub fn join(base_url: &str, route: &str) -> String {
    format!("{}{route}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_without_trailing_slash() {
        assert_eq!(
            join("https://gw.example.com:8000", gateway::K8S_AUTHS),
            "https://gw.example.com:8000/config/k8s-auths"
        );
    }

    #[test]
    fn test_join_strips_trailing_slashes() {
        assert_eq!(
            join("https://api.example.io//", control_plane::LIST_GATEWAYS),
            "https://api.example.io/list-gateways"
        );
    }

    #[test]
    fn test_token_reviews_path_matches_api_version() {
        assert!(kubernetes::TOKEN_REVIEWS
            .contains(kubernetes::AUTHENTICATION_API_VERSION));
    }
}
