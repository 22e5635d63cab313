//! Configuration Loader
//!
//! Environment-aware loading: a base file, an optional per-environment
//! override file next to it, then environment variables.

use super::ApprovalConfig;
use crate::error::{ApprovalError, ApprovalResult};
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_STEM: &str = "pending-approval";
pub const ENV_PREFIX: &str = "APPROVAL";

/// Loaded configuration together with where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ApprovalConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ApprovalResult<Self> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ApprovalResult<Self> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ApprovalResult<Self> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let base = config_directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let overrides = config_directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"));

        let config: ApprovalConfig = Config::builder()
            .add_source(File::from(base).format(FileFormat::Toml).required(false))
            .add_source(File::from(overrides).format(FileFormat::Toml).required(false))
            .add_source(Self::environment_source())
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            environment = environment,
            max_connections = config.database.max_connections,
            actions = config.approval.action_priority.len(),
            "Configuration loaded successfully"
        );

        Ok(Self {
            config,
            environment: environment.to_string(),
            config_directory,
        })
    }

    /// Load a single explicit file, still honouring environment variables
    pub fn load_from_file(path: &Path) -> ApprovalResult<Self> {
        if !path.exists() {
            return Err(ApprovalError::configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let config: ApprovalConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(Self::environment_source())
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(Self {
            config,
            environment: Self::detect_environment(),
            config_directory: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        })
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// `APPROVAL_DATABASE__URL`, `APPROVAL_APPROVAL__ACTION_PRIORITY=install,remove`, ...
    fn environment_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("approval.action_priority")
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("APPROVAL_ENV").unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("APPROVAL_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
