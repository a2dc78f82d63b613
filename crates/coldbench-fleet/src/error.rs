//! Fleet error types

use coldbench_cloud::{CloudError, FleetAction, ReplicaId};
use thiserror::Error;

/// Errors raised by the result sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Result table already initialized")]
    AlreadyInitialized,

    #[error("Result table has no header yet")]
    NotInitialized,

    #[error("Result table already flushed")]
    Closed,

    #[error("Failed to write result table: {0}")]
    Write(#[from] csv::Error),

    #[error("Result table lock poisoned by a panicked writer")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single replica failed
#[derive(Error, Debug)]
pub enum FailureCause {
    #[error(transparent)]
    Provider(#[from] CloudError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("task panicked: {0}")]
    Panic(String),
}

/// A replica whose action failed, with enough context to re-run it by hand
#[derive(Error, Debug)]
#[error("{action} of replica {replica} on {provider} failed: {cause}")]
pub struct ReplicaFailure {
    pub replica: ReplicaId,
    pub action: FleetAction,
    pub provider: String,
    #[source]
    pub cause: FailureCause,
}

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("A deploy run needs a result sink for the gateway table")]
    MissingSink,

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(
        "Batch {batch} aborted: {} failed, {} cancelled, {completed} completed",
        .failures.len(),
        .cancelled.len()
    )]
    BatchAborted {
        batch: usize,
        failures: Vec<ReplicaFailure>,
        /// Replicas whose in-flight call was dropped
        cancelled: Vec<ReplicaId>,
        completed: usize,
    },
}

impl FleetError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
