//! # Configuration
//!
//! Settings for the database connection, the approval display rules and
//! logging. Values are layered by [`ConfigManager`]: serde defaults, then
//! `pending-approval.toml`, then `pending-approval.{environment}.toml`, then
//! `APPROVAL_*` environment variables.
//!
//! ```rust,no_run
//! use pending_approval::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let settings = manager.config().aggregation_settings()?;
//! println!("no-version label: {}", settings.no_version_label);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::aggregation::{AggregationSettings, DEFAULT_NO_VERSION_LABEL};
use crate::error::{ApprovalError, ApprovalResult};
use crate::flow::DEFAULT_SESSION_TTL;
use crate::models::{Action, ActionPriority};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::ConfigManager;

/// Root configuration structure mirroring pending-approval.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub database: DatabaseSettings,
    pub approval: ApprovalSection,
    pub logging: LoggingSettings,
}

/// Database connection and pooling configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/pending_approval_development".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 30,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

/// Display rules for the approval form
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApprovalSection {
    /// Actions in the order they are listed under a package
    pub action_priority: Vec<String>,
    pub no_version_label: String,
    /// Idle time after which an unsubmitted flow session is discarded
    pub session_ttl_seconds: u64,
}

impl Default for ApprovalSection {
    fn default() -> Self {
        Self {
            action_priority: Action::ALL.iter().map(|a| a.as_str().to_string()).collect(),
            no_version_label: DEFAULT_NO_VERSION_LABEL.to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl ApprovalConfig {
    pub fn validate(&self) -> ApprovalResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(ApprovalError::configuration("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ApprovalError::configuration(
                "database.max_connections must be greater than zero",
            ));
        }
        if self.approval.no_version_label.is_empty() {
            return Err(ApprovalError::configuration(
                "approval.no_version_label must not be empty",
            ));
        }
        if self.approval.session_ttl_seconds == 0 {
            return Err(ApprovalError::configuration(
                "approval.session_ttl_seconds must be greater than zero",
            ));
        }
        ActionPriority::from_names(self.approval.action_priority.as_slice())?;
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.approval.session_ttl_seconds)
    }

    pub fn aggregation_settings(&self) -> ApprovalResult<AggregationSettings> {
        Ok(AggregationSettings {
            action_priority: ActionPriority::from_names(self.approval.action_priority.as_slice())?,
            no_version_label: self.approval.no_version_label.clone(),
        })
    }
}
