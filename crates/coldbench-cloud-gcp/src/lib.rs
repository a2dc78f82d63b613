//! GCP provider for coldbench
//!
//! Skeleton implementation. Replica actions return `NotImplemented`.
//!
//! # Requirements
//!
//! - `gcloud` CLI installed and authenticated (`gcloud auth login`)
//! - Optionally `gcp.project` in `coldbench.yaml`

pub mod error;
pub mod gcloud;
pub mod provider;

pub use error::{GcpError, Result};
pub use gcloud::Gcloud;
pub use provider::GcpProvider;
