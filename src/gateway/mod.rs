//! # Gateways
//!
//! Everything that talks to the control plane and the gateways it lists:
//!
//! - `client` - shared HTTP client (certificate verification on)
//! - `directory` - control-plane gateway listing (fatal on failure)
//! - `auth_configs` - per-gateway Kubernetes auth config collection (skip on failure)
//! - `filter` - eligibility rules and usable-name resolution
//! - `types` - wire types
//! - `error` - classified failure types

pub mod auth_configs;
pub mod client;
pub mod directory;
pub mod error;
pub mod filter;
pub mod types;

pub use auth_configs::FetchOutcome;
pub use client::GatewayClient;
pub use error::{DirectoryError, GatewayFetchError, RequestFailureReason};
pub use filter::{is_eligible, usable_name};
pub use types::{
    GatewayAuthConfigs, GatewayIdentity, GatewayStatus, KubeAuthConfig, SecretString,
};
