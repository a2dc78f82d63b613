//! GCP provider error types

use coldbench_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcpError {
    #[error("gcloud not found. Please install the Google Cloud SDK")]
    GcloudNotFound,

    #[error("gcloud has no active account. Run: gcloud auth login")]
    NoActiveAccount,

    #[error("gcloud command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GcpError> for CloudError {
    fn from(err: GcpError) -> Self {
        match err {
            GcpError::NoActiveAccount => CloudError::AuthenticationFailed(err.to_string()),
            GcpError::Io(e) => CloudError::Io(e),
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GcpError>;
