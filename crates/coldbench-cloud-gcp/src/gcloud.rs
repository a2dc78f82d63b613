//! gcloud CLI wrapper

use crate::error::{GcpError, Result};
use std::process::Stdio;
use tokio::process::Command;

pub struct Gcloud {
    project: Option<String>,
}

impl Gcloud {
    pub fn new(project: Option<String>) -> Self {
        Self { project }
    }

    /// Active account e-mail, if gcloud is installed and logged in
    pub async fn active_account(&self) -> Result<String> {
        let which = Command::new("which").arg("gcloud").output().await?;
        if !which.status.success() {
            return Err(GcpError::GcloudNotFound);
        }

        let account = self
            .run_command(&["config", "get-value", "account"])
            .await?;
        parse_config_value(&account).ok_or(GcpError::NoActiveAccount)
    }

    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("gcloud");
        cmd.args(args);
        if let Some(project) = &self.project {
            cmd.arg("--project").arg(project);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: gcloud {}", args.join(" "));

        let output = cmd.output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GcpError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// `gcloud config get-value` prints an empty line (or `(unset)`) for missing keys
fn parse_config_value(output: &str) -> Option<String> {
    let value = output.trim();
    if value.is_empty() || value == "(unset)" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_value() {
        assert_eq!(
            parse_config_value("bench@example.com\n").as_deref(),
            Some("bench@example.com")
        );
        assert_eq!(parse_config_value("\n"), None);
        assert_eq!(parse_config_value("(unset)"), None);
    }
}
