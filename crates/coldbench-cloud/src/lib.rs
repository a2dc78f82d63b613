//! coldbench cloud provider abstraction
//!
//! This crate defines the capability set every serverless backend must offer
//! so that a numbered fleet of function replicas can be deployed, updated and
//! removed without the orchestrator branching on provider identity.
//!
//! # Supported Providers
//!
//! - **AWS**: Lambda functions fronted by API Gateway REST APIs
//! - **Azure**: skeleton (authentication check only)
//! - **GCP**: skeleton (authentication check only)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 coldbench CLI                    │
//! │        (--action deploy|update|remove)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                coldbench-fleet                   │
//! │     batches · barrier · cancellation · sink      │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                coldbench-cloud                   │
//! │        trait FunctionProvider { ... }            │
//! └───────┬─────────────────┬───────────────┬───────┘
//!         │                 │               │
//! ┌───────▼───────┐ ┌───────▼──────┐ ┌──────▼──────┐
//! │      aws      │ │    azure     │ │     gcp     │
//! └───────────────┘ └──────────────┘ └─────────────┘
//! ```

pub mod action;
pub mod error;
pub mod provider;

// Re-exports
pub use action::FleetAction;
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, DeployedReplica, FunctionProvider, ProviderKind, ReplicaId};
