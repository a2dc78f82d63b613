//! Provider factory

use anyhow::Context;
use coldbench_cloud::{CloudError, FleetAction, FunctionProvider, ProviderKind};
use coldbench_cloud_aws::AwsProvider;
use coldbench_cloud_azure::AzureProvider;
use coldbench_cloud_gcp::GcpProvider;
use coldbench_config::BenchConfig;
use std::sync::Arc;

/// Build the provider for this run
///
/// The AWS package is only loaded when the action uploads code.
pub async fn connect(
    kind: ProviderKind,
    action: FleetAction,
    config: &BenchConfig,
) -> anyhow::Result<Arc<dyn FunctionProvider>> {
    let provider: Arc<dyn FunctionProvider> = match kind {
        ProviderKind::Aws => {
            let mut settings = config.aws.clone();
            if !action.needs_package() {
                settings.package = None;
            }
            let provider = AwsProvider::connect(&settings)
                .await
                .map_err(CloudError::from)
                .context("Failed to set up the AWS provider")?;
            Arc::new(provider)
        }
        ProviderKind::Azure => Arc::new(AzureProvider::new(&config.azure)),
        ProviderKind::Gcp => Arc::new(GcpProvider::new(&config.gcp)),
    };

    tracing::debug!("Using provider {}", provider.display_name());
    Ok(provider)
}

/// Settings an action cannot run without
pub fn check_requirements(
    kind: ProviderKind,
    action: FleetAction,
    config: &BenchConfig,
) -> Result<(), CloudError> {
    if kind != ProviderKind::Aws {
        return Ok(());
    }
    if action.needs_package() && config.aws.package.is_none() {
        return Err(CloudError::InvalidConfig(format!(
            "{} needs a function package: pass --package or set aws.package",
            action
        )));
    }
    if action == FleetAction::Deploy && config.aws.lambda_role().is_none() {
        return Err(CloudError::InvalidConfig(
            "deploy needs an execution role: set aws.role or AWS_LAMBDA_ROLE".to_string(),
        ));
    }
    Ok(())
}

/// Credential check before the first dispatch
pub async fn preflight(provider: &dyn FunctionProvider) -> anyhow::Result<()> {
    let status = provider.check_auth().await?;
    if !status.authenticated {
        anyhow::bail!(CloudError::AuthenticationFailed(format!(
            "{}: {}",
            provider.display_name(),
            status.error.unwrap_or_else(|| "not authenticated".to_string())
        )));
    }

    tracing::info!(
        "Authenticated with {} ({})",
        provider.display_name(),
        status.account_info.as_deref().unwrap_or("unknown account")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldbench_config::LAMBDA_ROLE_ENV;
    use serial_test::serial;

    fn aws_config(package: Option<&str>, role: Option<&str>) -> BenchConfig {
        let mut config = BenchConfig::default();
        config.aws.package = package.map(str::to_string);
        config.aws.role = role.map(str::to_string);
        config
    }

    #[test]
    #[serial]
    fn test_deploy_needs_package_and_role() {
        temp_env::with_var_unset(LAMBDA_ROLE_ENV, || {
            let err = check_requirements(
                ProviderKind::Aws,
                FleetAction::Deploy,
                &aws_config(None, Some("arn:aws:iam::0:role/bench")),
            )
            .unwrap_err();
            assert!(err.to_string().contains("--package"));

            let err = check_requirements(
                ProviderKind::Aws,
                FleetAction::Deploy,
                &aws_config(Some("bench.zip"), None),
            )
            .unwrap_err();
            assert!(err.to_string().contains("AWS_LAMBDA_ROLE"));

            assert!(
                check_requirements(
                    ProviderKind::Aws,
                    FleetAction::Deploy,
                    &aws_config(Some("bench.zip"), Some("arn:aws:iam::0:role/bench")),
                )
                .is_ok()
            );
        });
    }

    #[test]
    #[serial]
    fn test_remove_needs_nothing() {
        temp_env::with_var_unset(LAMBDA_ROLE_ENV, || {
            let config = aws_config(None, None);
            assert!(check_requirements(ProviderKind::Aws, FleetAction::Remove, &config).is_ok());
            assert!(check_requirements(ProviderKind::Gcp, FleetAction::Deploy, &config).is_ok());
        });
    }

    #[test]
    #[serial]
    fn test_update_needs_package_only() {
        temp_env::with_var_unset(LAMBDA_ROLE_ENV, || {
            let config = aws_config(Some("s3://bucket/bench.zip"), None);
            assert!(check_requirements(ProviderKind::Aws, FleetAction::Update, &config).is_ok());
        });
    }

    #[tokio::test]
    async fn test_connect_skeleton_providers() {
        let config = BenchConfig::default();

        let azure = connect(ProviderKind::Azure, FleetAction::Deploy, &config)
            .await
            .unwrap();
        assert_eq!(azure.name(), "azure");

        let gcp = connect(ProviderKind::Gcp, FleetAction::Remove, &config)
            .await
            .unwrap();
        assert_eq!(gcp.name(), "gcp");
    }
}
