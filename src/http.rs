//! # HTTP Client Setup
//!
//! rustls crypto provider installation and `reqwest` client construction
//! shared by the gateway clients and the token reviewer.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Install ring as the process-wide rustls crypto provider
///
/// Required for rustls 0.23+ when more than one provider may be compiled in.
/// Safe to call repeatedly; only the first call has an effect.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build a client with certificate verification enabled
pub fn verifying_client(timeout: Duration) -> Result<Client> {
    install_crypto_provider();
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Build a client that accepts any server certificate
///
/// Only the TokenReview call uses this: the cluster CA is exactly what is
/// under inspection, so verifying against it would be circular.
pub fn insecure_client(timeout: Duration) -> Result<Client> {
    install_crypto_provider();
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .build()
        .context("Failed to create HTTP client for token review")
}

/// Maximum number of characters of an error response body kept in messages
const BODY_EXCERPT_CHARS: usize = 200;

/// Shorten an error response body for logs and error messages
pub(crate) fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > BODY_EXCERPT_CHARS {
        let mut excerpt: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
        excerpt.push_str("...");
        excerpt
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_excerpt_short_body_unchanged() {
        assert_eq!(body_excerpt("  {\"error\": \"token expired\"}\n"), "{\"error\": \"token expired\"}");
    }

    #[test]
    fn test_body_excerpt_truncates_long_body() {
        let body = "x".repeat(500);
        let excerpt = body_excerpt(&body);
        assert_eq!(excerpt.len(), BODY_EXCERPT_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_clients_build() {
        let timeout = Duration::from_secs(1);
        assert!(verifying_client(timeout).is_ok());
        assert!(insecure_client(timeout).is_ok());
    }
}
