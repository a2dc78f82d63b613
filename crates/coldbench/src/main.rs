mod driver;
mod logging;
mod providers;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coldbench", version)]
#[command(
    about = "Deploy, update or remove a numbered fleet of serverless function replicas",
    long_about = None
)]
pub struct Cli {
    /// Replica range as <start>_<end>, end exclusive (e.g. 0_300)
    #[arg(long, env = "COLDBENCH_RANGE")]
    pub range: Option<String>,

    /// Action applied to every replica (deploy, update, remove)
    #[arg(long, env = "COLDBENCH_ACTION", default_value = "deploy")]
    pub action: String,

    /// Cloud provider (aws, azure, gcp)
    #[arg(long, env = "COLDBENCH_PROVIDER", default_value = "aws")]
    pub provider: String,

    /// Replicas actioned concurrently per batch
    #[arg(long, env = "COLDBENCH_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Function package: local ZIP path or s3://bucket/key
    #[arg(long, env = "COLDBENCH_PACKAGE")]
    pub package: Option<String>,

    /// Function runtime identifier (e.g. go1.x)
    #[arg(long, env = "COLDBENCH_RUNTIME")]
    pub runtime: Option<String>,

    /// Parent directory of the per-run output directories
    #[arg(long, env = "COLDBENCH_LOGS_DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Configuration file (default: discovered)
    #[arg(long, env = "COLDBENCH_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    driver::run(cli).await
}
