use super::action::Action;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Target version of a task.
///
/// `NotApplicable` maps to a NULL `to_version` column and is distinct from
/// every string, including the empty one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum TargetVersion {
    NotApplicable,
    Version(String),
}

impl TargetVersion {
    pub fn version(value: impl Into<String>) -> Self {
        Self::Version(value.into())
    }

    pub fn as_version(&self) -> Option<&str> {
        match self {
            Self::NotApplicable => None,
            Self::Version(value) => Some(value),
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// Display text, substituting `no_version_label` for the marker
    pub fn label<'a>(&'a self, no_version_label: &'a str) -> &'a str {
        self.as_version().unwrap_or(no_version_label)
    }
}

impl From<Option<String>> for TargetVersion {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(version) => Self::Version(version),
            None => Self::NotApplicable,
        }
    }
}

impl From<TargetVersion> for Option<String> {
    fn from(value: TargetVersion) -> Self {
        match value {
            TargetVersion::NotApplicable => None,
            TargetVersion::Version(version) => Some(version),
        }
    }
}

/// One task as held by the task store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub package: String,
    pub agent: String,
    pub action: Action,
    pub target_version: TargetVersion,
    pub approved: bool,
}

impl TaskRecord {
    /// Create an unapproved task
    pub fn pending(
        package: impl Into<String>,
        agent: impl Into<String>,
        action: Action,
        target_version: TargetVersion,
    ) -> Self {
        Self {
            package: package.into(),
            agent: agent.into(),
            action,
            target_version,
            approved: false,
        }
    }
}

/// Row of the grouped pending-task query.
///
/// `agent_count` is per package, repeated on every row of that package.
/// `action` stays raw so unknown values surface as integrity violations
/// during aggregation instead of failing row decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PendingTaskGroupRow {
    pub package: String,
    pub action: String,
    pub target_version: Option<String>,
    pub agent_count: i64,
}

/// Row of the filtered agent query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AgentPackageCountRow {
    pub agent: String,
    pub package_count: i64,
}
