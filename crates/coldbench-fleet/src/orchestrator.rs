//! Fleet action orchestrator
//!
//! Walks a replica range in fixed-size batches. Every replica of a batch runs
//! as its own task; the next batch starts only after the whole batch has been
//! joined. The first failure cancels the rest of its batch and ends the run.

use crate::error::{FailureCause, FleetError, ReplicaFailure, Result};
use crate::request::ActionRequest;
use crate::sink::ResultSink;
use coldbench_cloud::{FleetAction, FunctionProvider, ProviderKind, ReplicaId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

/// Statistics of a run that went through every batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub action: FleetAction,
    pub provider: ProviderKind,
    pub requested: usize,
    pub succeeded: usize,
    pub batches: usize,
    pub rows_written: usize,
    pub elapsed: Duration,
}

enum TaskOutcome {
    Completed,
    Cancelled,
    Failed(FailureCause),
}

#[derive(Default)]
struct BatchReport {
    completed: usize,
    cancelled: Vec<ReplicaId>,
    failures: Vec<ReplicaFailure>,
}

pub struct Orchestrator {
    provider: Arc<dyn FunctionProvider>,
    sink: Option<Arc<ResultSink>>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn FunctionProvider>) -> Self {
        Self {
            provider,
            sink: None,
        }
    }

    /// Table receiving one row per successful deploy
    pub fn with_sink(mut self, sink: Arc<ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub async fn execute(&self, request: &ActionRequest) -> Result<RunSummary> {
        let records_table = request.action.produces_table();
        if records_table && self.sink.is_none() {
            return Err(FleetError::MissingSink);
        }

        let started = Instant::now();
        let mut succeeded = 0;
        let mut batches = 0;

        tracing::info!(
            action = %request.action,
            provider = self.provider.name(),
            range = %request.range,
            concurrency = request.concurrency.get(),
            "Starting {} of {} replicas in {} batches",
            request.action,
            request.range.len(),
            request.batch_count()
        );

        for (index, batch) in request.range.batches(request.concurrency).enumerate() {
            let mut report = self.run_batch(index, batch, request.action).await;
            batches += 1;

            if !report.failures.is_empty() {
                report.cancelled.sort_unstable();
                if records_table {
                    self.flush_after_abort();
                }
                return Err(FleetError::BatchAborted {
                    batch: index,
                    failures: report.failures,
                    cancelled: report.cancelled,
                    completed: report.completed,
                });
            }
            succeeded += report.completed;
        }

        let rows_written = match &self.sink {
            Some(sink) if records_table => {
                sink.flush()?;
                sink.rows_written()
            }
            _ => 0,
        };

        let summary = RunSummary {
            action: request.action,
            provider: request.provider,
            requested: request.range.len(),
            succeeded,
            batches,
            rows_written,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Finished {} of {} replicas in {:.1?}",
            summary.action,
            summary.succeeded,
            summary.elapsed
        );
        Ok(summary)
    }

    async fn run_batch(
        &self,
        index: usize,
        batch: Vec<ReplicaId>,
        action: FleetAction,
    ) -> BatchReport {
        let first = batch.first().map(|id| id.get()).unwrap_or_default();
        let last = batch.last().map(|id| id.get()).unwrap_or_default();
        tracing::info!(
            batch = index,
            replicas = batch.len(),
            "Batch {}: replicas {}..={}",
            index,
            first,
            last
        );

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();
        let mut replicas = HashMap::with_capacity(batch.len());

        for replica in batch {
            let provider = Arc::clone(&self.provider);
            let sink = self.sink.clone();
            let cancel = cancel_rx.clone();

            tracing::debug!(batch = index, replica = replica.get(), "Dispatching {}", action);
            let handle = tasks.spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancelled(cancel) => TaskOutcome::Cancelled,
                    result = dispatch(provider.as_ref(), sink.as_deref(), action, replica) => {
                        match result {
                            Ok(()) => TaskOutcome::Completed,
                            Err(cause) => TaskOutcome::Failed(cause),
                        }
                    }
                }
            });
            replicas.insert(handle.id(), replica);
        }

        // Barrier
        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (replica, outcome) = match joined {
                Ok((id, outcome)) => (replicas.get(&id).copied(), outcome),
                Err(err) => (
                    replicas.get(&err.id()).copied(),
                    TaskOutcome::Failed(FailureCause::Panic(panic_message(err))),
                ),
            };
            let replica = replica.unwrap_or(ReplicaId(first));

            match outcome {
                TaskOutcome::Completed => {
                    tracing::debug!(replica = replica.get(), "{} finished", action);
                    report.completed += 1;
                }
                TaskOutcome::Cancelled => {
                    if action == FleetAction::Deploy {
                        tracing::warn!(
                            replica = replica.get(),
                            "deploy cancelled; replica {} may need cleanup with --action remove",
                            replica
                        );
                    } else {
                        tracing::warn!(replica = replica.get(), "{} cancelled", action);
                    }
                    report.cancelled.push(replica);
                }
                TaskOutcome::Failed(cause) => {
                    tracing::error!(
                        replica = replica.get(),
                        provider = self.provider.name(),
                        action = %action,
                        "Replica failed: {}",
                        cause
                    );
                    if report.failures.is_empty() {
                        cancel_tx.send_replace(true);
                    }
                    report.failures.push(ReplicaFailure {
                        replica,
                        action,
                        provider: self.provider.name().to_string(),
                        cause,
                    });
                }
            }
        }

        report
    }

    fn flush_after_abort(&self) {
        if let Some(sink) = &self.sink {
            match sink.flush() {
                Ok(()) => tracing::warn!(
                    "Run aborted; {} completed deployments kept in the result table",
                    sink.rows_written()
                ),
                Err(e) => tracing::error!("Failed to flush result table after abort: {}", e),
            }
        }
    }
}

async fn dispatch(
    provider: &dyn FunctionProvider,
    sink: Option<&ResultSink>,
    action: FleetAction,
    replica: ReplicaId,
) -> std::result::Result<(), FailureCause> {
    match action {
        FleetAction::Deploy => {
            let deployed = provider.deploy(replica).await?;
            tracing::info!(
                replica = replica.get(),
                "Deployed gateway {}",
                deployed.resource_id
            );
            if let Some(sink) = sink {
                sink.append_row([deployed.resource_id.as_str()])?;
            }
            Ok(())
        }
        FleetAction::Update => Ok(provider.update(replica).await?),
        FleetAction::Remove => Ok(provider.remove(replica).await?),
    }
}

/// Resolves once cancellation has been broadcast; never if the sender goes away
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
