//! Azure provider error types

use coldbench_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI")]
    CliNotFound,

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::Io(e) => CloudError::Io(e),
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
