//! Azure provider for coldbench
//!
//! Skeleton implementation. Only the credential preflight talks to Azure.
//!
//! # Requirements
//!
//! - `az` CLI installed and logged in (`az login`)

pub mod az;
pub mod error;
pub mod provider;

pub use az::AzCli;
pub use error::{AzureError, Result};
pub use provider::AzureProvider;
