//! # Local Cluster Identity
//!
//! Resolves the cluster the operator is pointed at from the local kubeconfig:
//! the selected context, its cluster's API server URL and the cluster CA.
//!
//! The server URL is used verbatim as the join key against gateway
//! registrations, and the CA is re-encoded with the standard base64 alphabet
//! so it can be compared byte for byte with the recorded `k8s_ca_cert`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kube::config::{Kubeconfig, KubeconfigError};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// The local kubeconfig could not provide a usable cluster identity
#[derive(Debug, Error)]
pub enum LocalClusterError {
    #[error("failed to read kubeconfig{}: {source}", .path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Read {
        path: Option<PathBuf>,
        #[source]
        source: KubeconfigError,
    },
    #[error("kubeconfig has no current context; pass --context")]
    NoCurrentContext,
    #[error("context '{0}' not found in kubeconfig")]
    ContextNotFound(String),
    #[error("cluster '{cluster}' referenced by context '{context}' not found in kubeconfig")]
    ClusterNotFound { context: String, cluster: String },
    #[error("cluster '{0}' has no server URL")]
    MissingServer(String),
    #[error("cluster '{cluster}' has invalid certificate-authority-data: {source}")]
    InvalidCaData {
        cluster: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to read certificate-authority file {}: {source}", .path.display())]
    CaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The cluster identity the gateways are reconciled against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalClusterIdentity {
    /// Files the identity was read from
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kubeconfig_paths: Vec<PathBuf>,
    pub context: String,
    pub cluster_name: String,
    /// AuthInfo referenced by the context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// API server URL, exactly as written in the kubeconfig
    pub server: String,
    /// Raw CA certificate bytes (PEM)
    #[serde(skip)]
    pub ca_data: Vec<u8>,
    /// Standard base64 encoding of `ca_data`
    pub ca_base64: String,
}

impl LocalClusterIdentity {
    pub fn new(
        context: impl Into<String>,
        cluster_name: impl Into<String>,
        namespace: Option<String>,
        server: impl Into<String>,
        ca_data: Vec<u8>,
    ) -> Self {
        let ca_base64 = STANDARD.encode(&ca_data);
        Self {
            kubeconfig_paths: Vec::new(),
            context: context.into(),
            cluster_name: cluster_name.into(),
            user: None,
            namespace,
            server: server.into(),
            ca_data,
            ca_base64,
        }
    }

    /// Load from the kubeconfig at `path`, or from the standard locations
    /// (`KUBECONFIG`, then `~/.kube/config`) when no path is given
    ///
    /// # Errors
    /// The kubeconfig cannot be read or does not describe the selected context.
    pub fn load(path: Option<&Path>, context: Option<&str>) -> Result<Self, LocalClusterError> {
        let kubeconfig = match path {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        }
        .map_err(|source| LocalClusterError::Read {
            path: path.map(Path::to_path_buf),
            source,
        })?;

        let mut identity = Self::from_kubeconfig(&kubeconfig, context)?;
        identity.kubeconfig_paths = match path {
            Some(path) => vec![path.to_path_buf()],
            None => default_kubeconfig_paths(),
        };
        Ok(identity)
    }

    /// Resolve the identity of `context` (or the current context) in `kubeconfig`
    ///
    /// # Errors
    /// The context, its cluster or the cluster's server are missing, or the CA
    /// data cannot be decoded.
    pub fn from_kubeconfig(
        kubeconfig: &Kubeconfig,
        context: Option<&str>,
    ) -> Result<Self, LocalClusterError> {
        let context_name = context
            .map(str::to_string)
            .or_else(|| kubeconfig.current_context.clone())
            .filter(|c| !c.is_empty())
            .ok_or(LocalClusterError::NoCurrentContext)?;

        let context_details = kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .and_then(|c| c.context.as_ref())
            .ok_or_else(|| LocalClusterError::ContextNotFound(context_name.clone()))?;

        let cluster_name = context_details.cluster.clone();
        let cluster = kubeconfig
            .clusters
            .iter()
            .find(|c| c.name == cluster_name)
            .and_then(|c| c.cluster.as_ref())
            .ok_or_else(|| LocalClusterError::ClusterNotFound {
                context: context_name.clone(),
                cluster: cluster_name.clone(),
            })?;

        let server = cluster
            .server
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LocalClusterError::MissingServer(cluster_name.clone()))?;

        let ca_data = if let Some(data) = cluster.certificate_authority_data.as_deref() {
            decode_ca_data(&cluster_name, data)?
        } else if let Some(file) = cluster.certificate_authority.as_deref() {
            std::fs::read(file).map_err(|source| LocalClusterError::CaFile {
                path: PathBuf::from(file),
                source,
            })?
        } else {
            warn!("Cluster '{}' has no certificate authority configured", cluster_name);
            Vec::new()
        };

        info!("Current context: {}", context_name);
        info!("Cluster: {}", cluster_name);
        debug!("Kubernetes cluster endpoint URL: {}", server);

        Ok(Self {
            user: context_details.user.clone().filter(|u| !u.is_empty()),
            ..Self::new(
                context_name,
                cluster_name,
                context_details.namespace.clone(),
                server,
                ca_data,
            )
        })
    }
}

/// Files read by the standard discovery: every `KUBECONFIG` entry, else `~/.kube/config`
#[must_use]
pub fn default_kubeconfig_paths() -> Vec<PathBuf> {
    discovery_paths(
        std::env::var_os(KUBECONFIG_ENV).as_deref(),
        home::home_dir(),
    )
}

fn discovery_paths(kubeconfig_env: Option<&OsStr>, home_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let from_env: Vec<PathBuf> = kubeconfig_env
        .map(|value| {
            std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();
    if !from_env.is_empty() {
        return from_env;
    }

    home_dir
        .map(|home| home.join(".kube").join("config"))
        .into_iter()
        .collect()
}

/// Decode kubeconfig `certificate-authority-data`, tolerating embedded line breaks
fn decode_ca_data(cluster: &str, data: &str) -> Result<Vec<u8>, LocalClusterError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|source| LocalClusterError::InvalidCaData {
            cluster: cluster.to_string(),
            source,
        })
}
