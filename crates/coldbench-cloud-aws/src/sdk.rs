//! AWS SDK wrapper
//!
//! Thin layer over the Lambda and API Gateway clients. Every method is a single
//! API interaction; sequencing lives in the provider.

use crate::error::{AwsError, Result};
use crate::package::CodeSource;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_apigateway::types::{EndpointConfiguration, EndpointType, IntegrationType};
use aws_sdk_lambda::types::{LastUpdateStatus, Runtime, TracingConfig, TracingMode};
use coldbench_config::AwsSettings;
use std::time::Duration;

const REQUEST_TEMPLATE_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const REQUEST_TEMPLATE: &str = r#"{"body": $input.json("$")}"#;
const PERMISSION_STATEMENT_ID: &str = "apigateway-benchmarking";
const UPDATE_POLL_INTERVAL: Duration = Duration::from_secs(1);
const UPDATE_POLL_ATTEMPTS: u32 = 120;

/// Function parameters for `CreateFunction` and `UpdateFunctionConfiguration`
#[derive(Debug, Clone)]
pub struct FunctionSpec<'a> {
    pub name: &'a str,
    pub runtime: &'a str,
    pub role: &'a str,
    pub handler: &'a str,
    pub timeout_secs: i32,
    pub memory_mb: i32,
}

/// Lambda + API Gateway clients sharing one SDK configuration
#[derive(Clone)]
pub struct AwsApi {
    lambda: aws_sdk_lambda::Client,
    apigateway: aws_sdk_apigateway::Client,
    region: String,
}

impl AwsApi {
    /// Load credentials from the default chain and build both clients
    pub async fn connect(settings: &AwsSettings) -> Self {
        let retry = RetryConfig::standard()
            .with_max_attempts(settings.retry.max_attempts.max(1))
            .with_initial_backoff(settings.retry.initial_delay())
            .with_max_backoff(settings.retry.max_delay());

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .retry_config(retry)
            .load()
            .await;

        tracing::debug!("AWS SDK configured for region {}", settings.region);

        Self {
            lambda: aws_sdk_lambda::Client::new(&sdk_config),
            apigateway: aws_sdk_apigateway::Client::new(&sdk_config),
            region: settings.region.clone(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Cheap authenticated call used as a credential check
    pub async fn check_account(&self) -> Result<()> {
        self.lambda
            .get_account_settings()
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda get-account-settings", e))?;
        Ok(())
    }

    // ========== Lambda ==========

    /// Create a function and return its ARN
    pub async fn create_function(
        &self,
        spec: &FunctionSpec<'_>,
        code: &CodeSource,
    ) -> Result<String> {
        let output = self
            .lambda
            .create_function()
            .function_name(spec.name)
            .runtime(Runtime::from(spec.runtime))
            .role(spec.role)
            .handler(spec.handler)
            .code(code.function_code())
            .tracing_config(TracingConfig::builder().mode(TracingMode::PassThrough).build())
            .timeout(spec.timeout_secs)
            .memory_size(spec.memory_mb)
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda create-function", e))?;

        match output.function_arn() {
            Some(arn) => Ok(arn.to_string()),
            None => self.function_arn(spec.name).await,
        }
    }

    pub async fn function_arn(&self, name: &str) -> Result<String> {
        let output = self
            .lambda
            .get_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda get-function", e))?;

        output
            .configuration()
            .and_then(|c| c.function_arn())
            .map(str::to_string)
            .ok_or_else(|| AwsError::missing("lambda get-function", "function ARN"))
    }

    pub async fn add_invoke_permission(&self, name: &str, source_arn: Option<&str>) -> Result<()> {
        self.lambda
            .add_permission()
            .function_name(name)
            .statement_id(PERMISSION_STATEMENT_ID)
            .action("lambda:InvokeFunction")
            .principal("apigateway.amazonaws.com")
            .set_source_arn(source_arn.map(str::to_string))
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda add-permission", e))?;
        Ok(())
    }

    pub async fn update_function_code(&self, name: &str, code: &CodeSource) -> Result<()> {
        let request = self.lambda.update_function_code().function_name(name);
        let request = match code {
            CodeSource::Zip { bytes, .. } => {
                request.zip_file(aws_sdk_lambda::primitives::Blob::new(bytes.to_vec()))
            }
            CodeSource::S3 { bucket, key } => {
                request.s3_bucket(bucket.as_str()).s3_key(key.as_str())
            }
        };

        request
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda update-function-code", e))?;
        Ok(())
    }

    pub async fn update_function_configuration(&self, spec: &FunctionSpec<'_>) -> Result<()> {
        self.lambda
            .update_function_configuration()
            .function_name(spec.name)
            .timeout(spec.timeout_secs)
            .memory_size(spec.memory_mb)
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda update-function-configuration", e))?;
        Ok(())
    }

    /// Poll until a previous code or configuration update has settled
    pub async fn wait_until_updated(&self, name: &str) -> Result<()> {
        for _ in 0..UPDATE_POLL_ATTEMPTS {
            let output = self
                .lambda
                .get_function_configuration()
                .function_name(name)
                .send()
                .await
                .map_err(|e| AwsError::sdk("lambda get-function-configuration", e))?;

            match output.last_update_status() {
                Some(LastUpdateStatus::InProgress) => {
                    tokio::time::sleep(UPDATE_POLL_INTERVAL).await;
                }
                Some(LastUpdateStatus::Failed) => {
                    return Err(AwsError::Sdk {
                        operation: "lambda update",
                        message: output
                            .last_update_status_reason()
                            .unwrap_or("update failed")
                            .to_string(),
                    });
                }
                _ => return Ok(()),
            }
        }
        Err(AwsError::Timeout(format!("update of {}", name)))
    }

    pub async fn delete_function(&self, name: &str) -> Result<()> {
        self.lambda
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| AwsError::sdk("lambda delete-function", e))?;
        Ok(())
    }

    // ========== API Gateway ==========

    /// Clone the template REST API under a new name and return the new API ID
    pub async fn create_rest_api(
        &self,
        name: &str,
        description: &str,
        clone_from: &str,
    ) -> Result<String> {
        let output = self
            .apigateway
            .create_rest_api()
            .name(name)
            .description(description)
            .endpoint_configuration(
                EndpointConfiguration::builder()
                    .types(EndpointType::Regional)
                    .build(),
            )
            .clone_from(clone_from)
            .send()
            .await
            .map_err(|e| AwsError::sdk("apigateway create-rest-api", e))?;

        output
            .id()
            .map(str::to_string)
            .ok_or_else(|| AwsError::missing("apigateway create-rest-api", "API ID"))
    }

    /// Find a REST API by its name, walking every result page
    pub async fn find_rest_api_id(&self, name: &str) -> Result<Option<String>> {
        let mut position: Option<String> = None;
        loop {
            let page = self
                .apigateway
                .get_rest_apis()
                .limit(500)
                .set_position(position.take())
                .send()
                .await
                .map_err(|e| AwsError::sdk("apigateway get-rest-apis", e))?;

            if let Some(api) = page.items().iter().find(|api| api.name() == Some(name)) {
                return Ok(api.id().map(str::to_string));
            }

            match page.position() {
                Some(next) if !next.is_empty() => position = Some(next.to_string()),
                _ => return Ok(None),
            }
        }
    }

    /// ID of the proxy resource inherited from the template API
    pub async fn proxy_resource_id(&self, api_id: &str) -> Result<String> {
        let output = self
            .apigateway
            .get_resources()
            .rest_api_id(api_id)
            .limit(500)
            .send()
            .await
            .map_err(|e| AwsError::sdk("apigateway get-resources", e))?;

        let paths: Vec<(Option<&str>, Option<&str>)> = output
            .items()
            .iter()
            .map(|resource| (resource.path(), resource.id()))
            .collect();

        select_proxy_resource(&paths)
            .map(str::to_string)
            .ok_or_else(|| AwsError::missing("apigateway get-resources", "proxy resource"))
    }

    pub async fn put_lambda_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        function_arn: &str,
    ) -> Result<()> {
        self.apigateway
            .put_integration()
            .rest_api_id(api_id)
            .resource_id(resource_id)
            .http_method("ANY")
            .r#type(IntegrationType::AwsProxy)
            .integration_http_method("POST")
            .uri(lambda_invocation_uri(&self.region, function_arn))
            .request_templates(REQUEST_TEMPLATE_CONTENT_TYPE, REQUEST_TEMPLATE)
            .send()
            .await
            .map_err(|e| AwsError::sdk("apigateway put-integration", e))?;
        Ok(())
    }

    pub async fn create_deployment(&self, api_id: &str, stage: &str) -> Result<()> {
        self.apigateway
            .create_deployment()
            .rest_api_id(api_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(|e| AwsError::sdk("apigateway create-deployment", e))?;
        Ok(())
    }

    pub async fn delete_rest_api(&self, api_id: &str) -> Result<()> {
        self.apigateway
            .delete_rest_api()
            .rest_api_id(api_id)
            .send()
            .await
            .map_err(|e| AwsError::sdk("apigateway delete-rest-api", e))?;
        Ok(())
    }
}

/// First resource that is not the API root
fn select_proxy_resource<'a>(
    resources: &[(Option<&'a str>, Option<&'a str>)],
) -> Option<&'a str> {
    resources
        .iter()
        .find(|(path, id)| id.is_some() && *path != Some("/"))
        .and_then(|(_, id)| *id)
}

pub(crate) fn lambda_invocation_uri(region: &str, function_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
        region, function_arn
    )
}

/// `arn:aws:execute-api:<region>:<account>:<api_id>/*` derived from a function ARN
pub(crate) fn execute_api_source_arn(function_arn: &str, api_id: &str) -> Option<String> {
    // arn:aws:lambda:<region>:<account>:function:<name>
    let parts: Vec<&str> = function_arn.split(':').collect();
    if parts.len() < 7 || parts[0] != "arn" || parts[2] != "lambda" {
        return None;
    }
    Some(format!(
        "arn:{}:execute-api:{}:{}:{}/*",
        parts[1], parts[3], parts[4], api_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_proxy_resource_skips_root() {
        let resources = [
            (Some("/"), Some("root01")),
            (Some("/{proxy+}"), Some("abc123")),
        ];
        assert_eq!(select_proxy_resource(&resources), Some("abc123"));

        // eu regions list the proxy resource first
        let resources = [
            (Some("/benchmarking"), Some("xyz789")),
            (Some("/"), Some("root01")),
        ];
        assert_eq!(select_proxy_resource(&resources), Some("xyz789"));
    }

    #[test]
    fn test_select_proxy_resource_none() {
        let resources = [(Some("/"), Some("root01"))];
        assert_eq!(select_proxy_resource(&resources), None);
        assert_eq!(select_proxy_resource(&[]), None);
    }

    #[test]
    fn test_lambda_invocation_uri() {
        assert_eq!(
            lambda_invocation_uri(
                "us-west-1",
                "arn:aws:lambda:us-west-1:123456789012:function:benchmarking-4"
            ),
            "arn:aws:apigateway:us-west-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-west-1:123456789012:function:benchmarking-4/invocations"
        );
    }

    #[test]
    fn test_execute_api_source_arn() {
        assert_eq!(
            execute_api_source_arn(
                "arn:aws:lambda:us-west-1:123456789012:function:benchmarking-4",
                "a1b2c3"
            )
            .as_deref(),
            Some("arn:aws:execute-api:us-west-1:123456789012:a1b2c3/*")
        );
        assert_eq!(execute_api_source_arn("not-an-arn", "a1b2c3"), None);
    }
}
