//! # Gateway Error Types
//!
//! Defines the two failure classes of the gateway clients:
//!
//! - [`DirectoryError`] - the control-plane directory could not be listed. Fatal to the run.
//! - [`GatewayFetchError`] - one gateway's auth configs could not be collected. Logged and skipped.
//!
//! Both carry a [`RequestFailureReason`] classifying what went wrong on the wire.

use serde::Serialize;
use thiserror::Error;

/// Classification of a failed outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestFailureReason {
    /// The request did not complete within the configured timeout
    Timeout,
    /// No connection could be established (DNS, refused, TLS handshake)
    Connect,
    /// Any other transport-level failure
    Transport,
    /// The server answered with a non-success HTTP status
    HttpStatus,
    /// The response body could not be decoded
    Decode,
}

impl RequestFailureReason {
    /// Classify a `reqwest` error
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else if error.is_status() {
            Self::HttpStatus
        } else if error.is_decode() {
            Self::Decode
        } else {
            Self::Transport
        }
    }

    /// Get human-readable reason string for logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::Decode => "decode",
        }
    }
}

/// The gateway directory could not be retrieved from the control plane
///
/// No partial directory is usable, so this aborts the run.
#[derive(Debug, Error)]
#[error("gateway directory unavailable ({}): {message}", .reason.as_str())]
pub struct DirectoryError {
    pub reason: RequestFailureReason,
    pub message: String,
    /// HTTP status, when the control plane answered
    pub status: Option<u16>,
}

impl DirectoryError {
    pub fn new(reason: RequestFailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Auth configs could not be collected from a single gateway
#[derive(Debug, Error)]
#[error("failed to collect k8s auth configs from gateway '{gateway}' ({}): {message}", .reason.as_str())]
pub struct GatewayFetchError {
    /// Usable name of the gateway
    pub gateway: String,
    pub reason: RequestFailureReason,
    pub message: String,
}

impl GatewayFetchError {
    pub fn new(
        gateway: impl Into<String>,
        reason: RequestFailureReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            gateway: gateway.into(),
            reason,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_display_includes_reason() {
        let err = DirectoryError::new(RequestFailureReason::HttpStatus, "401 Unauthorized")
            .with_status(401);
        assert_eq!(
            err.to_string(),
            "gateway directory unavailable (http_status): 401 Unauthorized"
        );
        assert_eq!(err.status, Some(401));
    }

    #[test]
    fn test_fetch_error_display_names_gateway() {
        let err = GatewayFetchError::new("shard-3", RequestFailureReason::Timeout, "timed out");
        assert_eq!(
            err.to_string(),
            "failed to collect k8s auth configs from gateway 'shard-3' (timeout): timed out"
        );
    }
}
