//! AWS provider error types

use coldbench_cloud::CloudError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} returned no {attribute}")]
    MissingAttribute {
        operation: &'static str,
        attribute: &'static str,
    },

    #[error("Lambda execution role not configured: set aws.role or AWS_LAMBDA_ROLE")]
    MissingRole,

    #[error("No function package configured: pass --package or set aws.package")]
    MissingPackage,

    #[error("Function package not found: {0}")]
    PackageNotFound(PathBuf),

    #[error("Invalid package reference: {0}")]
    InvalidPackage(String),

    #[error("REST API not found: {0}")]
    ApiNotFound(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AwsError {
    pub(crate) fn sdk<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Sdk {
            operation,
            message: aws_sdk_lambda::error::DisplayErrorContext(err).to_string(),
        }
    }

    pub(crate) fn missing(operation: &'static str, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            operation,
            attribute,
        }
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::MissingRole
            | AwsError::MissingPackage
            | AwsError::PackageNotFound(_)
            | AwsError::InvalidPackage(_) => CloudError::InvalidConfig(err.to_string()),
            AwsError::ApiNotFound(name) => CloudError::ResourceNotFound(name),
            AwsError::Io(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
