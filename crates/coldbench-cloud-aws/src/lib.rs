//! AWS provider for coldbench
//!
//! Each replica is a Lambda function fronted by its own API Gateway REST API,
//! cloned from a template API that already carries the `{proxy+}` resource.
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the default provider chain
//! - An execution role (`aws.role` or `AWS_LAMBDA_ROLE`) for deploys
//! - A function package (`aws.package` or `--package`) for deploys and updates
//!
//! # Example
//!
//! ```ignore
//! use coldbench_cloud::{FunctionProvider, ReplicaId};
//! use coldbench_cloud_aws::AwsProvider;
//! use coldbench_config::AwsSettings;
//!
//! let provider = AwsProvider::connect(&AwsSettings::default()).await?;
//! let deployed = provider.deploy(ReplicaId(0)).await?;
//! println!("gateway: {}", deployed.resource_id);
//! ```

pub mod error;
pub mod package;
pub mod provider;
pub mod sdk;

pub use error::{AwsError, Result};
pub use package::{CodeSource, PackageRef};
pub use provider::{AwsProvider, api_name, function_name};
pub use sdk::{AwsApi, FunctionSpec};
