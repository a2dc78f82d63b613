//! Function package handling
//!
//! The package is built outside coldbench; here it is only referenced, either as
//! a local ZIP archive (read once and shared by every task) or as an S3 object.

use crate::error::{AwsError, Result};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::FunctionCode;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the function package lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    Local(PathBuf),
    S3 { bucket: String, key: String },
}

impl PackageRef {
    /// Parse `s3://bucket/key` or a filesystem path (optionally `fileb://` prefixed)
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AwsError::InvalidPackage(value.to_string()));
        }

        if let Some(rest) = value.strip_prefix("s3://") {
            return match rest.split_once('/') {
                Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }),
                _ => Err(AwsError::InvalidPackage(value.to_string())),
            };
        }

        let path = value.strip_prefix("fileb://").unwrap_or(value);
        Ok(Self::Local(PathBuf::from(path)))
    }
}

/// Package contents ready to be attached to Lambda requests
#[derive(Debug, Clone)]
pub enum CodeSource {
    Zip { path: PathBuf, bytes: Arc<[u8]> },
    S3 { bucket: String, key: String },
}

impl CodeSource {
    pub async fn load(package: PackageRef) -> Result<Self> {
        match package {
            PackageRef::Local(path) => {
                if !path.is_file() {
                    return Err(AwsError::PackageNotFound(path));
                }
                let bytes = tokio::fs::read(&path).await?;
                tracing::info!(
                    "Loaded function package {} ({} bytes)",
                    path.display(),
                    bytes.len()
                );
                Ok(Self::Zip {
                    path,
                    bytes: Arc::from(bytes),
                })
            }
            PackageRef::S3 { bucket, key } => {
                tracing::info!("Using function package s3://{}/{}", bucket, key);
                Ok(Self::S3 { bucket, key })
            }
        }
    }

    /// Code block for `CreateFunction`
    pub fn function_code(&self) -> FunctionCode {
        match self {
            Self::Zip { bytes, .. } => FunctionCode::builder()
                .zip_file(Blob::new(bytes.to_vec()))
                .build(),
            Self::S3 { bucket, key } => FunctionCode::builder()
                .s3_bucket(bucket.as_str())
                .s3_key(key.as_str())
                .build(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Zip { path, .. } => path.display().to_string(),
            Self::S3 { bucket, key } => format!("s3://{}/{}", bucket, key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_reference() {
        assert_eq!(
            PackageRef::parse("s3://benchmarking-aws/benchmarking60000000.zip").unwrap(),
            PackageRef::S3 {
                bucket: "benchmarking-aws".to_string(),
                key: "benchmarking60000000.zip".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_local_reference() {
        assert_eq!(
            PackageRef::parse("fileb://benchmarking.zip").unwrap(),
            PackageRef::Local(PathBuf::from("benchmarking.zip"))
        );
        assert_eq!(
            PackageRef::parse("code/bench.zip").unwrap(),
            PackageRef::Local(PathBuf::from("code/bench.zip"))
        );
    }

    #[test]
    fn test_parse_invalid_reference() {
        assert!(PackageRef::parse("").is_err());
        assert!(PackageRef::parse("s3://bucket-only").is_err());
        assert!(PackageRef::parse("s3:///key").is_err());
    }

    #[tokio::test]
    async fn test_load_local_package() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bench.zip");
        std::fs::write(&path, b"PK\x03\x04fake").unwrap();

        let source = CodeSource::load(PackageRef::Local(path.clone())).await.unwrap();
        match source {
            CodeSource::Zip { bytes, .. } => assert_eq!(&bytes[..], b"PK\x03\x04fake"),
            other => panic!("expected zip source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_missing_package() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.zip");

        let err = CodeSource::load(PackageRef::Local(path)).await.unwrap_err();
        assert!(matches!(err, AwsError::PackageNotFound(_)));
    }
}
