//! coldbench fleet orchestration
//!
//! Turns an [`ActionRequest`] into provider calls: the replica range is cut into
//! batches of `concurrency` replicas, each batch runs concurrently and is fully
//! joined before the next one starts. Successful deploys are recorded in a
//! shared [`ResultSink`].
//!
//! # Example
//!
//! ```ignore
//! use coldbench_fleet::{ActionRequest, Orchestrator, ResultSink, GATEWAY_TABLE_HEADER};
//! use std::sync::Arc;
//!
//! let request = ActionRequest::parse("deploy", "aws", "0_10", 2)?;
//! let sink = Arc::new(ResultSink::create_csv(&path, [GATEWAY_TABLE_HEADER])?);
//! let summary = Orchestrator::new(provider).with_sink(sink).execute(&request).await?;
//! ```

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod sink;

pub use error::{FailureCause, FleetError, ReplicaFailure, Result, SinkError};
pub use orchestrator::{Orchestrator, RunSummary};
pub use request::{ActionRequest, Batches, ReplicaRange};
pub use sink::{GATEWAY_TABLE_FILE, GATEWAY_TABLE_HEADER, ResultSink};
