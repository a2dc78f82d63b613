//! AWS provider implementation
//!
//! A replica `i` is a Lambda function named `<app_name>-<i>` fronted by a REST
//! API named `<app_name>-API-<i>` cloned from the configured template API.

use crate::error::{AwsError, Result};
use crate::package::{CodeSource, PackageRef};
use crate::sdk::{AwsApi, FunctionSpec, execute_api_source_arn};
use async_trait::async_trait;
use coldbench_cloud::{AuthStatus, CloudError, DeployedReplica, FunctionProvider, ReplicaId};
use coldbench_config::AwsSettings;

pub fn function_name(app_name: &str, replica: ReplicaId) -> String {
    format!("{}-{}", app_name, replica)
}

pub fn api_name(app_name: &str, replica: ReplicaId) -> String {
    format!("{}-API-{}", app_name, replica)
}

/// AWS Lambda + API Gateway provider
pub struct AwsProvider {
    api: AwsApi,
    settings: AwsSettings,
    role: Option<String>,
    code: Option<CodeSource>,
}

impl AwsProvider {
    /// Build SDK clients and load the function package if one is configured
    ///
    /// The role and package are only validated when an action needs them, so a
    /// removal run works without either.
    pub async fn connect(settings: &AwsSettings) -> Result<Self> {
        let code = match settings.package.as_deref() {
            Some(package) => Some(CodeSource::load(PackageRef::parse(package)?).await?),
            None => None,
        };

        Ok(Self {
            api: AwsApi::connect(settings).await,
            settings: settings.clone(),
            role: settings.lambda_role(),
            code,
        })
    }

    fn code(&self) -> Result<&CodeSource> {
        self.code.as_ref().ok_or(AwsError::MissingPackage)
    }

    fn function_spec<'a>(
        &'a self,
        name: &'a str,
        role: &'a str,
        replica: ReplicaId,
    ) -> FunctionSpec<'a> {
        FunctionSpec {
            name,
            runtime: &self.settings.runtime,
            role,
            handler: &self.settings.handler,
            timeout_secs: self.settings.timeout_secs,
            memory_mb: self.settings.memory.for_replica(replica.get()),
        }
    }

    async fn deploy_replica(&self, replica: ReplicaId) -> Result<DeployedReplica> {
        let role = self.role.as_deref().ok_or(AwsError::MissingRole)?;
        let code = self.code()?;
        let name = function_name(&self.settings.app_name, replica);
        let spec = self.function_spec(&name, role, replica);

        tracing::info!(
            "Creating function {} ({} MB, package {})",
            name,
            spec.memory_mb,
            code.describe()
        );
        let function_arn = self.api.create_function(&spec, code).await?;

        let api = api_name(&self.settings.app_name, replica);
        let description = format!(
            "The API used to access benchmarking Lambda function {}",
            replica
        );
        let api_id = self
            .api
            .create_rest_api(&api, &description, &self.settings.clone_api_id)
            .await?;
        tracing::info!("Created REST API {} ({})", api, api_id);

        let resource_id = self.api.proxy_resource_id(&api_id).await?;
        self.api
            .put_lambda_integration(&api_id, &resource_id, &function_arn)
            .await?;
        self.api
            .create_deployment(&api_id, &self.settings.stage)
            .await?;
        tracing::debug!("Deployed {} to stage {}", api_id, self.settings.stage);

        let source_arn = execute_api_source_arn(&function_arn, &api_id);
        self.api
            .add_invoke_permission(&name, source_arn.as_deref())
            .await?;

        Ok(DeployedReplica::new(replica, api_id))
    }

    async fn update_replica(&self, replica: ReplicaId) -> Result<()> {
        let code = self.code()?;
        let name = function_name(&self.settings.app_name, replica);

        tracing::info!("Updating code of {} from {}", name, code.describe());
        self.api.update_function_code(&name, code).await?;
        self.api.wait_until_updated(&name).await?;

        // Role is not part of a configuration update
        let spec = self.function_spec(&name, "", replica);
        tracing::info!("Updating configuration of {} ({} MB)", name, spec.memory_mb);
        self.api.update_function_configuration(&spec).await
    }
}

#[async_trait]
impl FunctionProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn display_name(&self) -> &str {
        "AWS Lambda"
    }

    async fn check_auth(&self) -> coldbench_cloud::Result<AuthStatus> {
        match self.api.check_account().await {
            Ok(()) => Ok(AuthStatus::ok(format!("region {}", self.api.region()))),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn deploy(&self, replica: ReplicaId) -> coldbench_cloud::Result<DeployedReplica> {
        Ok(self.deploy_replica(replica).await?)
    }

    async fn update(&self, replica: ReplicaId) -> coldbench_cloud::Result<()> {
        Ok(self.update_replica(replica).await?)
    }

    async fn delete_function(&self, replica: ReplicaId) -> coldbench_cloud::Result<()> {
        let name = function_name(&self.settings.app_name, replica);
        tracing::info!("Deleting function {}", name);
        Ok(self.api.delete_function(&name).await?)
    }

    async fn resolve_fronting_resource_id(
        &self,
        replica: ReplicaId,
    ) -> coldbench_cloud::Result<String> {
        let name = api_name(&self.settings.app_name, replica);
        match self.api.find_rest_api_id(&name).await {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(CloudError::LookupFailed(format!("no REST API named {}", name))),
            Err(e) => Err(CloudError::LookupFailed(format!("{}: {}", name, e))),
        }
    }

    async fn delete_fronting_resource(
        &self,
        replica: ReplicaId,
        resource_id: &str,
    ) -> coldbench_cloud::Result<()> {
        tracing::info!("Deleting REST API {} of replica {}", resource_id, replica);
        Ok(self.api.delete_rest_api(resource_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(function_name("benchmarking", ReplicaId(4)), "benchmarking-4");
        assert_eq!(api_name("benchmarking", ReplicaId(4)), "benchmarking-API-4");
    }

    #[test]
    fn test_missing_package_is_config_error() {
        let err: CloudError = AwsError::MissingPackage.into();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_package() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = AwsSettings {
            package: Some(temp_dir.path().join("nope.zip").display().to_string()),
            ..Default::default()
        };

        match AwsProvider::connect(&settings).await {
            Err(AwsError::PackageNotFound(path)) => assert!(path.ends_with("nope.zip")),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connect should fail without a package file"),
        }
    }
}
