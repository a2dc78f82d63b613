//! Per-run output directory and log setup

use anyhow::Context;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const RUN_LOG_FILE: &str = "run_logs.txt";

const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Create `<logs_dir>/<timestamp>` for this run
pub fn create_run_dir(logs_dir: &Path) -> anyhow::Result<PathBuf> {
    let stamp = chrono::Local::now().format(RUN_DIR_FORMAT).to_string();
    let run_dir = logs_dir.join(stamp);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;
    Ok(run_dir)
}

/// Log to stdout and, without colours, to `run_logs.txt` in the run directory
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init(run_dir: &Path) -> anyhow::Result<PathBuf> {
    let log_path = run_dir.join(RUN_LOG_FILE);
    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_dir_is_timestamped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let run_dir = create_run_dir(&temp_dir.path().join("logs")).unwrap();

        assert!(run_dir.is_dir());
        let name = run_dir.file_name().unwrap().to_str().unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(name, RUN_DIR_FORMAT).is_ok(),
            "unexpected run directory name {}",
            name
        );
    }
}
