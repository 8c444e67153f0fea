//! # Gateway Types
//!
//! Wire types for the control-plane directory and the gateway auth-config listing.
//!
//! Field names follow the snake_case JSON the control plane and gateways emit;
//! camelCase aliases are accepted for directory entries. Absent and `null`
//! fields decode to their defaults so a sparse entry never fails the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::RUNNING_STATUS;

/// Decode `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Operational status reported by the control plane for a gateway cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum GatewayStatus {
    /// Exactly `"Running"`
    Running,
    /// Any other reported value, kept verbatim
    Other(String),
    /// Not reported
    #[default]
    Unknown,
}

impl From<Option<String>> for GatewayStatus {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) if s == RUNNING_STATUS => Self::Running,
            Some(s) => Self::Other(s),
            None => Self::Unknown,
        }
    }
}

impl From<GatewayStatus> for Option<String> {
    fn from(status: GatewayStatus) -> Self {
        match status {
            GatewayStatus::Running => Some(RUNNING_STATUS.to_string()),
            GatewayStatus::Other(s) => Some(s),
            GatewayStatus::Unknown => None,
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str(RUNNING_STATUS),
            Self::Other(s) => f.write_str(s),
            Self::Unknown => f.write_str("<unset>"),
        }
    }
}

/// One gateway cluster entry from the control-plane directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIdentity {
    /// Cluster name, often path-qualified (`org/team/shard-3`)
    #[serde(default, alias = "clusterName", deserialize_with = "null_as_default")]
    pub cluster_name: String,
    #[serde(default, alias = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: GatewayStatus,
    /// Base URL the gateway registered with; absent if it never phoned home
    #[serde(default, alias = "clusterUrl", skip_serializing_if = "Option::is_none")]
    pub cluster_url: Option<String>,
}

impl GatewayIdentity {
    /// Name used for filtering and reporting, see [`crate::gateway::filter::usable_name`]
    #[must_use]
    pub fn usable_name(&self) -> &str {
        super::filter::usable_name(self)
    }
}

/// Directory listing response: `{"clusters": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct GatewayList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<GatewayIdentity>,
}

/// Directory listing request body
#[derive(Debug, Serialize)]
pub struct ListGatewaysRequest<'a> {
    pub token: &'a str,
}

/// Secret material recorded on a gateway
///
/// Never printed through `Debug` and wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SecretString(<empty>)")
        } else {
            f.write_str("SecretString([REDACTED])")
        }
    }
}

/// One Kubernetes auth method configuration registered on a gateway
///
/// Only `k8s_host`, `k8s_ca_cert`, `k8s_token_reviewer_jwt`, `name` and
/// `auth_method_access_id` take part in reconciliation; everything else is
/// carried for reporting. Secret fields are skipped on serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeAuthConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protection_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auth_method_access_id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    pub auth_method_prv_key_pem: SecretString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub am_token_expiration: i64,
    /// Kubernetes API server URL the auth method trusts
    #[serde(default, deserialize_with = "null_as_default")]
    pub k8s_host: String,
    /// Base64 CA certificate recorded for the cluster
    #[serde(default, deserialize_with = "null_as_default")]
    pub k8s_ca_cert: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    pub k8s_token_reviewer_jwt: SecretString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub k8s_issuer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub k8s_pub_keys_pem: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disable_iss_validation: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub use_local_ca_jwt: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster_api_type: String,
}

/// Gateway auth-config listing response: `{"k8s_auths": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct KubeAuthConfigList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub k8s_auths: Vec<KubeAuthConfig>,
}

/// One gateway together with the auth configs collected from it
///
/// Only built for gateways that returned at least one config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAuthConfigs {
    pub gateway: GatewayIdentity,
    pub configs: Vec<KubeAuthConfig>,
}
