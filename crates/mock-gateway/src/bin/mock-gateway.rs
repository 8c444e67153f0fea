//! Mock Gateway Server
//!
//! Serves a fixture file as the control plane, its gateways and the
//! Kubernetes TokenReview endpoint, for manual runs of `k8s-auth-check`.
//!
//! Environment Variables:
//! - FIXTURE: path of the JSON fixture file (required)
//! - PORT: port to listen on (default: 1234)
//! - MOCK_URL: base URL substituted for `${MOCK_URL}` in the fixture
//!   (default: http://127.0.0.1:<PORT>)

use anyhow::{Context, Result};
use mock_gateway::{router, AppState, Fixtures};
use std::env;
use std::net::SocketAddr;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let fixture_path = env::var("FIXTURE").context("FIXTURE must point to a fixture file")?;
    let port = env::var("PORT")
        .unwrap_or_else(|_| "1234".to_string())
        .parse::<u16>()
        .context("PORT must be a valid u16")?;
    let base_url = env::var("MOCK_URL").unwrap_or_else(|_| format!("http://127.0.0.1:{port}"));

    info!("Starting mock gateway...");
    info!("Fixture: {}", fixture_path);

    let document = std::fs::read_to_string(&fixture_path)
        .with_context(|| format!("Failed to read fixture file {fixture_path}"))?;
    let fixtures = Fixtures::from_json(&document, &base_url)
        .with_context(|| format!("Invalid fixture file {fixture_path}"))?;
    info!(
        "Loaded {} gateway(s), {} gateway answer(s), {} token review(s)",
        fixtures.clusters.len(),
        fixtures.gateways.len(),
        fixtures.token_reviews.len()
    );

    let app = router(AppState::new(fixtures));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Mock gateway ready at {}", base_url);

    axum::serve(listener, app).await?;
    Ok(())
}
