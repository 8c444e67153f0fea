//! # k8s-auth-check
//!
//! Checks whether any gateway reachable with an access token trusts the
//! Kubernetes cluster of the current kubeconfig context, and whether the
//! recorded reviewer JWT is still accepted by that cluster.
//!
//! ## Usage
//!
//! ```bash
//! # Check every gateway visible to the token
//! k8s-auth-check --token t-123
//!
//! # Only gateways whose name starts with "prod", with CA and per-gateway details
//! AKEYLESS_TOKEN=t-123 k8s-auth-check -g prod -v
//!
//! # Machine-readable report for another context
//! k8s-auth-check -t t-123 --context staging -o json
//! ```
//!
//! Reports go to stdout, logs to stderr. The exit status is non-zero only when
//! a run could not be performed (missing token, unreadable kubeconfig, gateway
//! directory unavailable); "no match" is a successful run.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use k8s_auth_reconciler::constants::{
    DEFAULT_API_GATEWAY_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_FILTER, VERBOSE_LOG_FILTER,
};
use k8s_auth_reconciler::gateway::SecretString;
use k8s_auth_reconciler::report::{render_json, TextReport};
use k8s_auth_reconciler::{diagnose, LocalClusterIdentity, OutputFormat, RunConfig};

/// Kubernetes auth method diagnostics for secrets gateways
#[derive(Parser)]
#[command(name = "k8s-auth-check")]
#[command(version, about = "Check gateway Kubernetes auth methods against the local cluster", long_about = None)]
struct Cli {
    /// Access token used to list gateways and read their auth configs
    #[arg(short, long, env = "AKEYLESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Control-plane API URL
    #[arg(short = 'u', long, env = "AKEYLESS_API_GATEWAY_URL", default_value = DEFAULT_API_GATEWAY_URL)]
    api_gateway_url: String,

    /// Only check gateways whose name starts with this prefix
    #[arg(short = 'g', long, env = "AKEYLESS_GATEWAY_NAME_FILTER", default_value = "")]
    gateway_name_filter: String,

    /// Kubeconfig file (defaults to KUBECONFIG, then ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to check (defaults to the current context)
    #[arg(long)]
    context: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "AKEYLESS_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Print the cluster CA, per-gateway details and debug logs
    #[arg(short, long, env = "AKEYLESS_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn into_run_config(self) -> RunConfig {
        RunConfig {
            token: SecretString::new(self.token.unwrap_or_default()),
            api_url: self.api_gateway_url,
            gateway_name_filter: self.gateway_name_filter,
            kubeconfig: self.kubeconfig,
            context: self.context,
            timeout: Duration::from_secs(self.timeout_secs),
            output: self.output,
            verbose: self.verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.into_run_config().validate()?;

    let local = LocalClusterIdentity::load(config.kubeconfig.as_deref(), config.context.as_deref())
        .context("Unable to determine the local Kubernetes cluster")?;

    let diagnosis = diagnose(&config, local).await?;

    match config.output {
        OutputFormat::Text => print!("{}", TextReport::new(&diagnosis, config.verbose)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&diagnosis).context("Failed to serialize report")?
        ),
    }

    Ok(())
}
