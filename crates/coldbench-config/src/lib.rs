pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{
    AwsSettings, AzureSettings, BenchConfig, GcpSettings, LAMBDA_ROLE_ENV, MemoryTiers,
    RetrySettings,
};

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a configuration file
pub const CONFIG_PATH_ENV: &str = "COLDBENCH_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["coldbench.local.yaml", "coldbench.yaml"];

/// coldbench's per-user configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("coldbench");

    Ok(config_dir)
}

/// Locate the configuration file
///
/// Search order:
/// 1. `COLDBENCH_CONFIG_PATH` (must exist when set)
/// 2. current directory: `coldbench.local.yaml`, `coldbench.yaml`
/// 3. `./.coldbench/` with the same names
/// 4. `<config_dir>/coldbench/coldbench.yaml`
///
/// Returns `Ok(None)` when no file exists anywhere; built-in defaults apply then.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let hidden_dir = current_dir.join(".coldbench");
    if hidden_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = hidden_dir.join(filename);
            if path.exists() {
                return Ok(Some(path));
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("coldbench.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Parse a configuration file; an empty file yields the defaults
pub fn load_from_path(path: &Path) -> Result<BenchConfig> {
    if !path.exists() {
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BenchConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration from an explicit path, or discover it
pub fn load(explicit: Option<&Path>) -> Result<BenchConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_from_path(&path)
        }
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Ok(BenchConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("coldbench.yaml"), "concurrency: 2\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        let found = result.unwrap().unwrap();
        assert!(found.ends_with("coldbench.yaml"));
    }

    #[test]
    #[serial]
    fn test_local_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("coldbench.yaml"), "concurrency: 2\n").unwrap();
        fs::write(temp_dir.path().join("coldbench.local.yaml"), "concurrency: 8\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().unwrap().ends_with("coldbench.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_hidden_dir_lookup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let hidden = temp_dir.path().join(".coldbench");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("coldbench.yaml"), "concurrency: 3\n").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = temp_env::with_var_unset(CONFIG_PATH_ENV, find_config_file);

        std::env::set_current_dir(original_dir).unwrap();

        let found = result.unwrap().unwrap();
        assert!(found.ends_with(".coldbench/coldbench.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_path_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "concurrency: 5\n").unwrap();

        let result = temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), find_config_file);
        assert_eq!(result.unwrap(), Some(config_path));
    }

    #[test]
    #[serial]
    fn test_env_path_missing_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.yaml");

        let result = temp_env::with_var(CONFIG_PATH_ENV, Some(&missing), find_config_file);
        match result {
            Err(ConfigError::ConfigFileNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected ConfigFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("coldbench.yaml");
        fs::write(
            &path,
            "default_range: 10_20\nconcurrency: 4\naws:\n  package: s3://bucket/bench.zip\n",
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.default_range, "10_20");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.aws.package.as_deref(), Some("s3://bucket/bench.zip"));
        assert_eq!(config.aws.runtime, "go1.x");
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("coldbench.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(load_from_path(&path).unwrap(), BenchConfig::default());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("coldbench.yaml");
        fs::write(&path, "concurrency: [not, a, number]\n").unwrap();

        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nope.yaml");

        assert!(matches!(
            load(Some(&path)),
            Err(ConfigError::ConfigFileNotFound(_))
        ));
    }
}
