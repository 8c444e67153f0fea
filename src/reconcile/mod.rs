//! # Reconciliation
//!
//! The core of the tool: collect gateway auth configs, match them against the
//! local cluster and validate the matched reviewer credentials.
//!
//! ## Sub-modules
//!
//! - `aggregate` - sequential collection over the gateway directory
//! - `matcher` - host and CA comparison against the local cluster
//! - `pipeline` - TokenReview validation and the end-to-end run

pub mod aggregate;
pub mod matcher;
pub mod pipeline;

pub use aggregate::{aggregate, AuthConfigSource};
pub use matcher::{match_clusters, ClusterMatch};
pub use pipeline::{
    diagnose, reconcile, validate_matches, CollectedGateway, CredentialValidator, Diagnosis,
    ValidatedMatch,
};
