//! Canned responses served by the mock
//!
//! A fixture set describes one scenario: the gateway directory, what each
//! gateway answers for its Kubernetes auth configs and how each cluster
//! answers TokenReviews, keyed by the reviewed JWT.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Placeholder replaced by the server's base URL when loading a fixture file
pub const BASE_URL_PLACEHOLDER: &str = "${MOCK_URL}";

/// A status code together with a JSON body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MockResponse {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: Value,
}

fn default_status() -> u16 {
    200
}

impl MockResponse {
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    #[must_use]
    pub fn with_status(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Gateway answer listing `configs` under `k8s_auths`
    #[must_use]
    pub fn k8s_auths(configs: Vec<Value>) -> Self {
        Self::ok(json!({ "k8s_auths": configs }))
    }

    /// TokenReview answer as returned by a real API server
    #[must_use]
    pub fn token_review(authenticated: bool, username: Option<&str>, error: Option<&str>) -> Self {
        let mut status = json!({ "authenticated": authenticated });
        if let Some(username) = username {
            status["user"] = json!({
                "username": username,
                "groups": ["system:serviceaccounts", "system:authenticated"],
            });
        }
        if let Some(error) = error {
            status["error"] = json!(error);
        }
        Self::ok(json!({
            "kind": paths::kubernetes::TOKEN_REVIEW_KIND,
            "apiVersion": paths::kubernetes::AUTHENTICATION_API_VERSION,
            "metadata": { "creationTimestamp": null },
            "spec": {},
            "status": status,
        }))
    }
}

/// One scenario
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Fixtures {
    /// Access token the control plane accepts; any token when unset
    #[serde(default)]
    pub access_token: Option<String>,
    /// Overrides the directory answer, e.g. to simulate an outage
    #[serde(default)]
    pub list_gateways: Option<MockResponse>,
    /// Directory entries returned under `clusters`
    #[serde(default)]
    pub clusters: Vec<Value>,
    /// Auth-config answers keyed by gateway route name
    #[serde(default)]
    pub gateways: HashMap<String, MockResponse>,
    /// TokenReview answers keyed by reviewed JWT
    #[serde(default)]
    pub token_reviews: HashMap<String, MockResponse>,
}

impl Fixtures {
    /// Parse a fixture document, substituting [`BASE_URL_PLACEHOLDER`]
    ///
    /// # Errors
    /// The document is not a valid fixture set.
    pub fn from_json(document: &str, base_url: &str) -> serde_json::Result<Self> {
        serde_json::from_str(&document.replace(BASE_URL_PLACEHOLDER, base_url))
    }

    /// Directory answer for the current fixture set
    #[must_use]
    pub fn directory_response(&self) -> MockResponse {
        self.list_gateways
            .clone()
            .unwrap_or_else(|| MockResponse::ok(json!({ "clusters": self.clusters })))
    }

    /// Answer for a TokenReview of `jwt`; unknown tokens are not authenticated
    #[must_use]
    pub fn token_review_response(&self, jwt: &str) -> MockResponse {
        self.token_reviews.get(jwt).cloned().unwrap_or_else(|| {
            MockResponse::token_review(false, None, Some("[invalid bearer token]"))
        })
    }
}
