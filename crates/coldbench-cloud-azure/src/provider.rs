//! Azure provider implementation
//!
//! Skeleton: authentication is checked through the az CLI, every replica
//! action reports `NotImplemented`.

use crate::az::AzCli;
use crate::error::AzureError;
use async_trait::async_trait;
use coldbench_cloud::{
    AuthStatus, CloudError, DeployedReplica, FunctionProvider, ReplicaId, Result,
};
use coldbench_config::AzureSettings;

/// Azure Functions provider
pub struct AzureProvider {
    cli: AzCli,
    settings: AzureSettings,
}

impl AzureProvider {
    pub fn new(settings: &AzureSettings) -> Self {
        Self {
            cli: AzCli,
            settings: settings.clone(),
        }
    }

    fn unsupported(&self, operation: &str, replica: ReplicaId) -> CloudError {
        tracing::warn!(
            location = %self.settings.location,
            "Azure {} of replica {} is not implemented",
            operation,
            replica
        );
        CloudError::not_implemented(self.name(), operation)
    }
}

#[async_trait]
impl FunctionProvider for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    fn display_name(&self) -> &str {
        "Azure Functions"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.cli.active_subscription().await {
            Ok(subscription) => Ok(AuthStatus::ok(subscription)),
            Err(AzureError::CliNotFound) => Ok(AuthStatus::failed("az is not installed")),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn deploy(&self, replica: ReplicaId) -> Result<DeployedReplica> {
        Err(self.unsupported("deploy", replica))
    }

    async fn update(&self, replica: ReplicaId) -> Result<()> {
        Err(self.unsupported("update", replica))
    }

    async fn delete_function(&self, replica: ReplicaId) -> Result<()> {
        Err(self.unsupported("delete function", replica))
    }

    async fn resolve_fronting_resource_id(&self, replica: ReplicaId) -> Result<String> {
        Err(self.unsupported("resolve fronting resource", replica))
    }

    async fn delete_fronting_resource(
        &self,
        replica: ReplicaId,
        _resource_id: &str,
    ) -> Result<()> {
        Err(self.unsupported("delete fronting resource", replica))
    }
}
