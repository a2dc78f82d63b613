//! az CLI wrapper
//!
//! Only the account check is wired up so far.

use crate::error::{AzureError, Result};
use std::process::Stdio;
use tokio::process::Command;

pub struct AzCli;

impl AzCli {
    /// Name of the active subscription, if `az` is installed and logged in
    pub async fn active_subscription(&self) -> Result<String> {
        let which = Command::new("which").arg("az").output().await?;
        if !which.status.success() {
            return Err(AzureError::CliNotFound);
        }

        let output = self
            .run_command(&["account", "show", "--query", "name", "--output", "tsv"])
            .await?;
        Ok(output.trim().to_string())
    }

    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("az");
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: az {}", args.join(" "));

        let output = cmd.output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
