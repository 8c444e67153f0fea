//! # Run Configuration
//!
//! Validated settings for one diagnostic run, built from the CLI flags and
//! their `AKEYLESS_`-prefixed environment variables.
//!
//! The access token is the only mandatory value; it is checked here, before
//! any network call is made.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{DEFAULT_API_GATEWAY_URL, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::gateway::SecretString;

/// Invalid or missing run configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("access token is not set. Set it with -t/--token or the AKEYLESS_TOKEN environment variable")]
    MissingToken,
    #[error("API gateway URL must not be empty")]
    EmptyApiUrl,
    #[error("HTTP timeout must be greater than 0 seconds")]
    ZeroTimeout,
}

/// Report format written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub token: SecretString,
    /// Control-plane base URL without trailing slash
    pub api_url: String,
    /// Usable-name prefix; empty means every gateway
    pub gateway_name_filter: String,
    /// Explicit kubeconfig; `None` uses the standard discovery
    pub kubeconfig: Option<PathBuf>,
    /// Context override; `None` uses the kubeconfig's current context
    pub context: Option<String>,
    pub timeout: Duration,
    pub output: OutputFormat,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            token: SecretString::default(),
            api_url: DEFAULT_API_GATEWAY_URL.to_string(),
            gateway_name_filter: String::new(),
            kubeconfig: None,
            context: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            output: OutputFormat::default(),
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Check the preconditions of a run and normalize the URL
    ///
    /// # Errors
    /// Missing token, empty control-plane URL or a zero timeout.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.token.expose().trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let api_url = self.api_url.trim().trim_end_matches('/');
        if api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        self.api_url = api_url.to_string();

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token(token: &str) -> RunConfig {
        RunConfig {
            token: SecretString::new(token),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = with_token("t-123").validate().unwrap();
        assert_eq!(config.api_url, "https://api.akeyless.io");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.gateway_name_filter.is_empty());
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(with_token("").validate().unwrap_err(), ConfigError::MissingToken);
        assert_eq!(with_token("   ").validate().unwrap_err(), ConfigError::MissingToken);
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = RunConfig {
            api_url: "https://api.example.io/".to_string(),
            ..with_token("t")
        }
        .validate()
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.io");
    }

    #[test]
    fn test_empty_api_url() {
        let err = RunConfig {
            api_url: " / ".to_string(),
            ..with_token("t")
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyApiUrl);
    }

    #[test]
    fn test_zero_timeout() {
        let err = RunConfig {
            timeout: Duration::ZERO,
            ..with_token("t")
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroTimeout);
    }
}
