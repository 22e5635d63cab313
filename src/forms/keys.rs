//! Composite checkbox identifiers.
//!
//! Free-text parts are hex-encoded so names are safe as form field names and
//! decode exactly. Task keys look like `hex(package)_action_version`, where
//! the version part is `hex(version)` or [`NO_VERSION_MARKER`]. The marker is
//! not a hex digit, so "no version" never collides with an empty version
//! string (whose part is empty). Agent keys look like `agent_hex(name)`.

use crate::error::{ApprovalError, ApprovalResult};
use crate::models::{Action, TargetVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_SEPARATOR: char = '_';
pub const NO_VERSION_MARKER: &str = "-";
pub const AGENT_KEY_PREFIX: &str = "agent_";

fn decode_hex_text(encoded: &str, what: &str) -> ApprovalResult<String> {
    let bytes = hex::decode(encoded).map_err(|e| {
        ApprovalError::integrity(format!("{what} '{encoded}' is not valid hex: {e}"))
    })?;
    String::from_utf8(bytes).map_err(|e| {
        ApprovalError::integrity(format!("{what} '{encoded}' is not valid UTF-8: {e}"))
    })
}

/// One selectable (package, action, target version) triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub package: String,
    pub action: Action,
    pub target_version: TargetVersion,
}

impl TaskKey {
    pub fn new(package: impl Into<String>, action: Action, target_version: TargetVersion) -> Self {
        Self {
            package: package.into(),
            action,
            target_version,
        }
    }

    pub fn encode(&self) -> String {
        let version = match &self.target_version {
            TargetVersion::NotApplicable => NO_VERSION_MARKER.to_string(),
            TargetVersion::Version(version) => hex::encode(version),
        };
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{version}",
            hex::encode(&self.package),
            self.action
        )
    }

    pub fn decode(field: &str) -> ApprovalResult<Self> {
        Self::parse_field(field)?.ok_or_else(|| {
            ApprovalError::integrity(format!("'{field}' is not a task identifier"))
        })
    }

    /// Recognize a task identifier among arbitrary field names.
    ///
    /// Returns `Ok(None)` for names of another shape. A name with the shape of
    /// a task identifier whose parts fail to decode is an error.
    pub fn parse_field(field: &str) -> ApprovalResult<Option<Self>> {
        let parts: Vec<&str> = field.split(KEY_SEPARATOR).collect();
        let [package, action, version] = parts.as_slice() else {
            return Ok(None);
        };
        let Ok(action) = action.parse::<Action>() else {
            return Ok(None);
        };

        let package = decode_hex_text(package, "package")?;
        let target_version = if *version == NO_VERSION_MARKER {
            TargetVersion::NotApplicable
        } else {
            TargetVersion::Version(decode_hex_text(version, "target version")?)
        };

        Ok(Some(Self {
            package,
            action,
            target_version,
        }))
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// One selectable agent
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentKey {
    pub agent: String,
}

impl AgentKey {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{AGENT_KEY_PREFIX}{}", hex::encode(&self.agent))
    }

    pub fn decode(field: &str) -> ApprovalResult<Self> {
        Self::parse_field(field)?.ok_or_else(|| {
            ApprovalError::integrity(format!("'{field}' is not an agent identifier"))
        })
    }

    pub fn parse_field(field: &str) -> ApprovalResult<Option<Self>> {
        match field.strip_prefix(AGENT_KEY_PREFIX) {
            Some(encoded) => Ok(Some(Self::new(decode_hex_text(encoded, "agent")?))),
            None => Ok(None),
        }
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
