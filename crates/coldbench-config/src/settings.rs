//! Typed settings loaded from `coldbench.yaml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when `aws.role` is not set in the file
pub const LAMBDA_ROLE_ENV: &str = "AWS_LAMBDA_ROLE";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Replica range used when `--range` is not given (`<start>_<end>`)
    pub default_range: String,

    /// Number of replicas actioned concurrently per batch
    pub concurrency: usize,

    /// Parent directory of the per-run output directories
    pub logs_dir: PathBuf,

    pub aws: AwsSettings,
    pub azure: AzureSettings,
    pub gcp: GcpSettings,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            default_range: "0_300".to_string(),
            concurrency: 1,
            logs_dir: PathBuf::from("logs"),
            aws: AwsSettings::default(),
            azure: AzureSettings::default(),
            gcp: GcpSettings::default(),
        }
    }
}

/// AWS Lambda + API Gateway settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: String,

    /// Prefix of function and API names (`<app_name>-<i>`, `<app_name>-API-<i>`)
    pub app_name: String,

    /// REST API every replica's API is cloned from
    pub clone_api_id: String,

    /// API Gateway deployment stage
    pub stage: String,

    /// Execution role ARN; falls back to `AWS_LAMBDA_ROLE`
    pub role: Option<String>,

    pub handler: String,

    /// Lambda runtime identifier (e.g. `go1.x`, `python3.12`)
    pub runtime: String,

    pub timeout_secs: i32,

    pub memory: MemoryTiers,

    /// Function package: a local ZIP path or `s3://bucket/key`
    pub package: Option<String>,

    pub retry: RetrySettings,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "us-west-1".to_string(),
            app_name: "benchmarking".to_string(),
            clone_api_id: "hjnwqihyo1".to_string(),
            stage: "prod".to_string(),
            role: None,
            handler: "producer-handler".to_string(),
            runtime: "go1.x".to_string(),
            timeout_secs: 900,
            memory: MemoryTiers::default(),
            package: None,
            retry: RetrySettings::default(),
        }
    }
}

impl AwsSettings {
    /// Execution role from the file, else from the environment
    pub fn lambda_role(&self) -> Option<String> {
        self.role
            .clone()
            .or_else(|| std::env::var(LAMBDA_ROLE_ENV).ok())
            .filter(|role| !role.trim().is_empty())
    }
}

/// Memory assigned to a replica depending on its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTiers {
    /// First replica index that gets `above_mb`
    pub threshold: u32,
    pub below_mb: i32,
    pub above_mb: i32,
}

impl Default for MemoryTiers {
    fn default() -> Self {
        Self {
            threshold: 300,
            below_mb: 128,
            above_mb: 1536,
        }
    }
}

impl MemoryTiers {
    pub fn for_replica(&self, replica: u32) -> i32 {
        if replica < self.threshold {
            self.below_mb
        } else {
            self.above_mb
        }
    }
}

/// Retry policy handed to the provider SDK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetrySettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    pub resource_group: Option<String>,
    pub location: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            resource_group: None,
            location: "westeurope".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpSettings {
    pub project: Option<String>,
    pub region: String,
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            project: None,
            region: "us-west1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_tiers() {
        let tiers = MemoryTiers::default();
        assert_eq!(tiers.for_replica(0), 128);
        assert_eq!(tiers.for_replica(299), 128);
        assert_eq!(tiers.for_replica(300), 1536);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "concurrency: 4\naws:\n  region: eu-west-2\n  memory:\n    threshold: 10\n";
        let config: BenchConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.default_range, "0_300");
        assert_eq!(config.aws.region, "eu-west-2");
        assert_eq!(config.aws.stage, "prod");
        assert_eq!(config.aws.memory.threshold, 10);
        assert_eq!(config.aws.memory.above_mb, 1536);
    }

    #[test]
    fn test_role_from_file_wins() {
        let settings = AwsSettings {
            role: Some("arn:aws:iam::123456789012:role/bench".to_string()),
            ..Default::default()
        };
        temp_env::with_var(LAMBDA_ROLE_ENV, Some("arn:aws:iam::0:role/env"), || {
            assert_eq!(
                settings.lambda_role().as_deref(),
                Some("arn:aws:iam::123456789012:role/bench")
            );
        });
    }

    #[test]
    fn test_role_falls_back_to_env() {
        let settings = AwsSettings::default();
        temp_env::with_var(LAMBDA_ROLE_ENV, Some("arn:aws:iam::0:role/env"), || {
            assert_eq!(
                settings.lambda_role().as_deref(),
                Some("arn:aws:iam::0:role/env")
            );
        });
        temp_env::with_var_unset(LAMBDA_ROLE_ENV, || {
            assert!(settings.lambda_role().is_none());
        });
    }
}
