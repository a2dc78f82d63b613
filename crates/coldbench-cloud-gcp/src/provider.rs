//! GCP provider implementation
//!
//! This is a skeleton implementation for future development.

use crate::error::GcpError;
use crate::gcloud::Gcloud;
use async_trait::async_trait;
use coldbench_cloud::{
    AuthStatus, CloudError, DeployedReplica, FunctionProvider, ReplicaId, Result,
};
use coldbench_config::GcpSettings;

/// Google Cloud Functions provider
pub struct GcpProvider {
    gcloud: Gcloud,
    region: String,
}

impl GcpProvider {
    pub fn new(settings: &GcpSettings) -> Self {
        Self {
            gcloud: Gcloud::new(settings.project.clone()),
            region: settings.region.clone(),
        }
    }

    fn unsupported(&self, operation: &str) -> CloudError {
        CloudError::not_implemented(format!("{} ({})", self.name(), self.region), operation)
    }
}

#[async_trait]
impl FunctionProvider for GcpProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    fn display_name(&self) -> &str {
        "Google Cloud Functions"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.gcloud.active_account().await {
            Ok(account) => Ok(AuthStatus::ok(account)),
            Err(GcpError::GcloudNotFound) => Ok(AuthStatus::failed("gcloud is not installed")),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn deploy(&self, _replica: ReplicaId) -> Result<DeployedReplica> {
        Err(self.unsupported("deploy"))
    }

    async fn update(&self, _replica: ReplicaId) -> Result<()> {
        Err(self.unsupported("update"))
    }

    async fn delete_function(&self, _replica: ReplicaId) -> Result<()> {
        Err(self.unsupported("delete function"))
    }

    async fn resolve_fronting_resource_id(&self, _replica: ReplicaId) -> Result<String> {
        Err(self.unsupported("resolve fronting resource"))
    }

    async fn delete_fronting_resource(
        &self,
        _replica: ReplicaId,
        _resource_id: &str,
    ) -> Result<()> {
        Err(self.unsupported("delete fronting resource"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_actions_are_not_implemented() {
        let provider = GcpProvider::new(&GcpSettings::default());

        let err = tokio_test::assert_err!(provider.update(ReplicaId(9)).await);
        match err {
            CloudError::NotImplemented {
                provider,
                operation,
            } => {
                assert_eq!(provider, "gcp (us-west1)");
                assert_eq!(operation, "update");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_no_account_is_auth_failure() {
        let err: CloudError = GcpError::NoActiveAccount.into();
        assert!(matches!(err, CloudError::AuthenticationFailed(_)));
    }
}
