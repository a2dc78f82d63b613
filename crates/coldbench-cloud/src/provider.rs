//! Function provider trait definition

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use std::str::FromStr;

/// Index of one function replica within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplicaId(pub u32);

impl ReplicaId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ReplicaId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a successful deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedReplica {
    pub replica: ReplicaId,

    /// Identifier of the fronting resource (e.g. the API Gateway ID)
    pub resource_id: String,
}

impl DeployedReplica {
    pub fn new(replica: ReplicaId, resource_id: impl Into<String>) -> Self {
        Self {
            replica,
            resource_id: resource_id.into(),
        }
    }
}

/// Function provider abstraction trait
///
/// Every backend (AWS, Azure, GCP) implements this trait so the orchestrator
/// can action replicas without knowing which cloud it talks to. Implementations
/// must be safe to call concurrently for distinct replicas.
#[async_trait]
pub trait FunctionProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws", "gcp")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Provision one replica and its fronting resource
    async fn deploy(&self, replica: ReplicaId) -> Result<DeployedReplica>;

    /// Push new code and configuration to an already deployed replica
    async fn update(&self, replica: ReplicaId) -> Result<()>;

    /// Delete the function of a replica
    async fn delete_function(&self, replica: ReplicaId) -> Result<()>;

    /// Look up the identifier of the replica's fronting resource
    async fn resolve_fronting_resource_id(&self, replica: ReplicaId) -> Result<String>;

    /// Delete the fronting resource with the given identifier
    async fn delete_fronting_resource(&self, replica: ReplicaId, resource_id: &str)
    -> Result<()>;

    /// Tear down a replica: function first, then its fronting resource
    async fn remove(&self, replica: ReplicaId) -> Result<()> {
        self.delete_function(replica).await?;

        let resource_id = self
            .resolve_fronting_resource_id(replica)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    provider = self.name(),
                    replica = replica.get(),
                    "Could not resolve fronting resource: {}",
                    e
                );
            })?;

        self.delete_fronting_resource(replica, &resource_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    provider = self.name(),
                    replica = replica.get(),
                    resource_id = %resource_id,
                    "Could not delete fronting resource: {}",
                    e
                );
            })
    }
}

/// Providers known to the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Aws,
    Azure,
    Gcp,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Azure => "azure",
            ProviderKind::Gcp => "gcp",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" | "amazon" => Ok(ProviderKind::Aws),
            "azure" => Ok(ProviderKind::Azure),
            "gcp" | "google" => Ok(ProviderKind::Gcp),
            _ => Err(CloudError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Authentication status
#[derive(Debug, Clone)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
