//! # Constants
//!
//! Default values shared by the CLI, configuration and HTTP clients.

/// Default control-plane base URL
pub const DEFAULT_API_GATEWAY_URL: &str = "https://api.akeyless.io";

/// Default timeout for every outbound HTTP call (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Gateway status value that makes a directory entry eligible for collection
pub const RUNNING_STATUS: &str = "Running";

/// Leaf cluster name assigned by automated provisioning; not a meaningful display name
pub const DEFAULT_CLUSTER_PLACEHOLDER: &str = "defaultCluster";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "k8s_auth_reconciler=info";

/// Tracing filter used with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "k8s_auth_reconciler=debug";
