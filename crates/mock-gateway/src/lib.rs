//! # Mock Gateway
//!
//! A lightweight Axum server standing in for everything the reconciler talks to:
//!
//! - the control plane: `POST /list-gateways`
//! - any number of gateways: `GET /gw/{gateway}/config/k8s-auths`
//! - any number of Kubernetes API servers:
//!   `POST /k8s/{cluster}/apis/authentication.k8s.io/v1/tokenreviews`
//!
//! Gateways and clusters are distinguished by a path prefix so one listener
//! serves a whole scenario. Every request is recorded for assertions.

pub mod fixtures;

pub use fixtures::{Fixtures, MockResponse, BASE_URL_PLACEHOLDER};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// A request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    /// Parsed JSON body, if the request carried one
    pub body: Option<Value>,
}

/// Shared server state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub fixtures: Arc<RwLock<Fixtures>>,
    pub requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl AppState {
    #[must_use]
    pub fn new(fixtures: Fixtures) -> Self {
        Self {
            fixtures: Arc::new(RwLock::new(fixtures)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
        let request = RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: serde_json::from_slice(body).ok(),
        };
        self.requests.write().await.push(request);
    }
}

fn respond(response: MockResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

/// Route prefix for gateway `name`
#[must_use]
pub fn gateway_route(name: &str) -> String {
    format!("/gw/{name}")
}

/// Route prefix for Kubernetes cluster `name`
#[must_use]
pub fn cluster_route(name: &str) -> String {
    format!("/k8s/{name}")
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /list-gateways
async fn list_gateways(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&method, &uri, &headers, &body).await;
    let fixtures = state.fixtures.read().await;

    if let Some(expected) = fixtures.access_token.as_deref() {
        let token = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("token").and_then(Value::as_str).map(str::to_string));
        if token.as_deref() != Some(expected) {
            warn!("  LIST GATEWAYS rejected: invalid access token");
            return respond(MockResponse::with_status(
                401,
                json!({ "error": "Unauthorized: access token is not valid" }),
            ));
        }
    }

    let response = fixtures.directory_response();
    info!("  LIST GATEWAYS -> {}", response.status);
    respond(response)
}

/// GET /gw/{gateway}/config/k8s-auths
async fn k8s_auths(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(&method, &uri, &headers, &Bytes::new()).await;
    let fixtures = state.fixtures.read().await;

    match fixtures.gateways.get(&gateway) {
        Some(response) => {
            info!("  K8S AUTHS: gateway={} -> {}", gateway, response.status);
            respond(response.clone())
        }
        None => {
            warn!("  K8S AUTHS: unknown gateway {}", gateway);
            respond(MockResponse::with_status(
                404,
                json!({ "error": format!("gateway not found: {gateway}") }),
            ))
        }
    }
}

/// POST /k8s/{cluster}/apis/authentication.k8s.io/v1/tokenreviews
async fn token_reviews(
    State(state): State<AppState>,
    Path(cluster): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(&method, &uri, &headers, &body).await;

    let token = serde_json::from_slice::<Value>(&body).ok().and_then(|v| {
        v.pointer("/spec/token")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let Some(token) = token else {
        warn!("  TOKEN REVIEW: cluster={} request without spec.token", cluster);
        return respond(MockResponse::with_status(
            400,
            json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "TokenReview spec.token is required",
                "reason": "BadRequest",
                "code": 400,
            }),
        ));
    };

    let response = state.fixtures.read().await.token_review_response(&token);
    info!("  TOKEN REVIEW: cluster={} -> {}", cluster, response.status);
    respond(response)
}

/// Build the mock router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(paths::control_plane::LIST_GATEWAYS, post(list_gateways))
        .route(
            &format!("{}{}", gateway_route("{gateway}"), paths::gateway::K8S_AUTHS),
            get(k8s_auths),
        )
        .route(
            &format!(
                "{}{}",
                cluster_route("{cluster}"),
                paths::kubernetes::TOKEN_REVIEWS
            ),
            post(token_reviews),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// A running mock bound to an ephemeral local port
///
/// The server task is aborted on drop.
#[derive(Debug)]
pub struct MockGateway {
    url: String,
    state: AppState,
    handle: JoinHandle<()>,
}

impl MockGateway {
    /// Start serving `fixtures` on `127.0.0.1` with an OS-assigned port
    ///
    /// # Errors
    /// The listener cannot be bound.
    pub async fn start(fixtures: Fixtures) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let state = AppState::new(fixtures);
        let app = router(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!("Mock gateway stopped: {}", e);
            }
        });

        Ok(Self {
            url: format!("http://{addr}"),
            state,
            handle,
        })
    }

    /// Base URL, usable as the control-plane URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Cluster URL for gateway `name`
    #[must_use]
    pub fn gateway_url(&self, name: &str) -> String {
        format!("{}{}", self.url, gateway_route(name))
    }

    /// API server URL for Kubernetes cluster `name`
    #[must_use]
    pub fn cluster_url(&self, name: &str) -> String {
        format!("{}{}", self.url, cluster_route(name))
    }

    /// Replace the scenario being served
    pub async fn set_fixtures(&self, fixtures: Fixtures) {
        *self.state.fixtures.write().await = fixtures;
    }

    /// Every request received so far, in arrival order
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().await.clone()
    }

    /// Requests whose path ends with `suffix`
    pub async fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_gateways_checks_token() {
        let mock = MockGateway::start(Fixtures {
            access_token: Some("t-1".to_string()),
            clusters: vec![json!({"cluster_name": "acc/gw", "status": "Running"})],
            ..Fixtures::default()
        })
        .await
        .unwrap();
        let client = reqwest::Client::new();
        let url = format!("{}{}", mock.url(), paths::control_plane::LIST_GATEWAYS);

        let ok = client.post(&url).json(&json!({"token": "t-1"})).send().await.unwrap();
        assert_eq!(ok.status(), 200);
        let body: Value = ok.json().await.unwrap();
        assert_eq!(body["clusters"][0]["cluster_name"], "acc/gw");

        let denied = client.post(&url).json(&json!({"token": "nope"})).send().await.unwrap();
        assert_eq!(denied.status(), 401);

        assert_eq!(mock.requests_to(paths::control_plane::LIST_GATEWAYS).await.len(), 2);
    }

    #[tokio::test]
    async fn test_k8s_auths_unknown_gateway() {
        let mock = MockGateway::start(Fixtures::default()).await.unwrap();
        let url = format!("{}{}", mock.gateway_url("missing"), paths::gateway::K8S_AUTHS);

        let response = reqwest::Client::new()
            .get(&url)
            .bearer_auth("t-1")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
        let recorded = mock.requests().await;
        assert_eq!(recorded[0].path, "/gw/missing/config/k8s-auths");
        assert_eq!(recorded[0].authorization.as_deref(), Some("Bearer t-1"));
    }

    #[tokio::test]
    async fn test_token_review_by_jwt() {
        let mut fixtures = Fixtures::default();
        fixtures.token_reviews.insert(
            "good".to_string(),
            MockResponse::token_review(true, Some("system:serviceaccount:ns:sa"), None),
        );
        let mock = MockGateway::start(fixtures).await.unwrap();
        let url = format!("{}{}", mock.cluster_url("dev"), paths::kubernetes::TOKEN_REVIEWS);
        let client = reqwest::Client::new();

        let good: Value = client
            .post(&url)
            .json(&json!({"spec": {"token": "good"}}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(good["status"]["authenticated"], true);

        let missing = client.post(&url).json(&json!({"spec": {}})).send().await.unwrap();
        assert_eq!(missing.status(), 400);
    }
}
