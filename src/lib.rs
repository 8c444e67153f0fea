//! # K8s Auth Reconciler
//!
//! Diagnoses whether any secrets gateway reachable with an access token holds
//! a Kubernetes auth method for the cluster selected in the local kubeconfig,
//! and whether that auth method still works.
//!
//! ## Overview
//!
//! One run:
//!
//! 1. **Local identity** - read the current kubeconfig context, its API server URL and CA
//! 2. **Gateway directory** - list every gateway the token can see (fatal on failure)
//! 3. **Aggregation** - collect Kubernetes auth configs from every running gateway
//! 4. **Matching** - keep configs whose host equals the local API server URL and compare CAs
//! 5. **Validation** - submit each matched reviewer JWT to the cluster's TokenReview API
//!
//! A run without matches still completes and is reported as a finding.

pub mod config;
pub mod constants;
pub mod gateway;
pub mod http;
pub mod local_cluster;
pub mod reconcile;
pub mod report;
pub mod token_review;

pub use config::{ConfigError, OutputFormat, RunConfig};
pub use local_cluster::{LocalClusterError, LocalClusterIdentity};
pub use reconcile::{diagnose, Diagnosis};
pub use token_review::{TokenReviewOutcome, TokenReviewer};
