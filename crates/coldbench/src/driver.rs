//! Run driver: configuration, run directory, provider, orchestrator

use crate::Cli;
use crate::{logging, providers};
use anyhow::Context;
use coldbench_cloud::{FleetAction, ReplicaId};
use coldbench_config::BenchConfig;
use coldbench_fleet::{
    ActionRequest, FleetError, GATEWAY_TABLE_FILE, GATEWAY_TABLE_HEADER, Orchestrator,
    ResultSink, RunSummary,
};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        coldbench_config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    let run_dir = logging::create_run_dir(&config.logs_dir)?;
    let log_path = logging::init(&run_dir)?;
    tracing::info!("Run log: {}", log_path.display());

    let range = cli
        .range
        .clone()
        .unwrap_or_else(|| config.default_range.clone());
    let concurrency = cli.concurrency.unwrap_or(config.concurrency);
    let request = ActionRequest::parse(&cli.action, &cli.provider, &range, concurrency)
        .inspect_err(|e| tracing::error!("{}", e))?;

    println!(
        "{} {} replicas {} on {} ({} at a time)",
        "▶".blue().bold(),
        request.action.to_string().cyan(),
        request.range.to_string().cyan(),
        request.provider.to_string().cyan(),
        request.concurrency
    );

    // An empty range touches no cloud resources
    if !request.range.is_empty() {
        providers::check_requirements(request.provider, request.action, &config)
            .inspect_err(|e| tracing::error!("{}", e))?;
    }

    let provider = providers::connect(request.provider, request.action, &config)
        .await
        .inspect_err(|e| tracing::error!("{:#}", e))?;

    if !request.range.is_empty() {
        providers::preflight(provider.as_ref())
            .await
            .inspect_err(|e| tracing::error!("{:#}", e))?;
    }

    let mut orchestrator = Orchestrator::new(provider);
    let table_path = run_dir.join(GATEWAY_TABLE_FILE);
    if request.action.produces_table() {
        let sink = ResultSink::create_csv(&table_path, [GATEWAY_TABLE_HEADER])
            .with_context(|| format!("Failed to create {}", table_path.display()))?;
        orchestrator = orchestrator.with_sink(Arc::new(sink));
    }

    match orchestrator.execute(&request).await {
        Ok(summary) => {
            print_summary(&summary, &table_path);
            Ok(())
        }
        Err(err) => {
            print_failure(&err, request.action, &run_dir);
            Err(err.into())
        }
    }
}

fn apply_overrides(config: &mut BenchConfig, cli: &Cli) {
    if let Some(package) = &cli.package {
        config.aws.package = Some(package.clone());
    }
    if let Some(runtime) = &cli.runtime {
        config.aws.runtime = runtime.clone();
    }
    if let Some(logs_dir) = &cli.logs_dir {
        config.logs_dir = logs_dir.clone();
    }
}

fn print_summary(summary: &RunSummary, table_path: &Path) {
    println!();
    println!(
        "{} {} finished on {}: {}/{} replicas in {} batches ({:.1?})",
        "✓".green().bold(),
        summary.action,
        summary.provider,
        summary.succeeded.to_string().green(),
        summary.requested,
        summary.batches,
        summary.elapsed
    );
    if summary.action.produces_table() {
        println!(
            "  Gateway table: {} ({} rows)",
            table_path.display().to_string().cyan(),
            summary.rows_written
        );
    }
}

/// Cancelled deploys may have created remote resources without a table row
fn cancelled_line(action: FleetAction, cancelled: &[ReplicaId]) -> Option<String> {
    if cancelled.is_empty() {
        return None;
    }
    let ids = cancelled
        .iter()
        .map(ReplicaId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let line = if action == FleetAction::Deploy {
        format!(
            "  cancelled: {} (may need cleanup with --action remove)",
            ids.yellow()
        )
    } else {
        format!("  cancelled: {}", ids.yellow())
    };
    Some(line)
}

fn print_failure(err: &FleetError, action: FleetAction, run_dir: &Path) {
    println!();
    println!("{} {}", "✗".red().bold(), err.to_string().red());
    if let FleetError::BatchAborted {
        failures,
        cancelled,
        ..
    } = err
    {
        for failure in failures {
            println!(
                "  replica {}: {}",
                failure.replica.to_string().yellow(),
                failure.cause
            );
        }
        if let Some(line) = cancelled_line(action, cancelled) {
            println!("{}", line);
        }
    }
    println!("  Logs: {}", run_dir.display().to_string().cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "coldbench",
            "--package",
            "s3://bucket/bench.zip",
            "--runtime",
            "provided.al2023",
            "--logs-dir",
            "/tmp/bench-logs",
        ]);
        let mut config = BenchConfig::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.aws.package.as_deref(), Some("s3://bucket/bench.zip"));
        assert_eq!(config.aws.runtime, "provided.al2023");
        assert_eq!(config.logs_dir, Path::new("/tmp/bench-logs"));
    }

    #[test]
    fn test_cancelled_deploys_flagged_for_cleanup() {
        colored::control::set_override(false);
        let line = cancelled_line(FleetAction::Deploy, &[ReplicaId(3), ReplicaId(5)]).unwrap();
        assert_eq!(line, "  cancelled: 3, 5 (may need cleanup with --action remove)");

        let line = cancelled_line(FleetAction::Update, &[ReplicaId(3)]).unwrap();
        assert_eq!(line, "  cancelled: 3");

        assert!(cancelled_line(FleetAction::Deploy, &[]).is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_config_kept_without_flags() {
        temp_env::with_vars_unset(
            ["COLDBENCH_PACKAGE", "COLDBENCH_RUNTIME", "COLDBENCH_LOGS_DIR"],
            || {
                let cli = Cli::parse_from(["coldbench", "--range", "0_10"]);
                let mut config = BenchConfig::default();
                apply_overrides(&mut config, &cli);

                assert_eq!(config, BenchConfig::default());
            },
        );
    }
}
