//! Provider error types

use thiserror::Error;

/// Errors raised by function providers
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Unsupported provider: {0} (expected one of: aws, azure, gcp)")]
    UnsupportedProvider(String),

    #[error("Unrecognized function action: {0} (expected one of: deploy, update, remove)")]
    InvalidAction(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Fronting resource lookup failed: {0}")]
    LookupFailed(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not implemented for {provider}: {operation}")]
    NotImplemented {
        provider: String,
        operation: String,
    },

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudError {
    pub fn not_implemented(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            provider: provider.into(),
            operation: operation.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
