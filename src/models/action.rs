use crate::error::{ApprovalError, ApprovalResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package actions an agent can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Install,
    Update,
    Configure,
    Remove,
    Purge,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Install,
        Action::Update,
        Action::Configure,
        Action::Remove,
        Action::Purge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::Configure => "configure",
            Self::Remove => "remove",
            Self::Purge => "purge",
        }
    }

    /// Parse an action read from the task store, treating unknown values as corrupt data
    pub fn from_stored(value: &str) -> ApprovalResult<Self> {
        value
            .parse()
            .map_err(|_| ApprovalError::integrity(format!("unknown task action '{value}'")))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Self::Install),
            "update" => Ok(Self::Update),
            "configure" => Ok(Self::Configure),
            "remove" => Ok(Self::Remove),
            "purge" => Ok(Self::Purge),
            _ => Err(format!("Invalid action: {s}")),
        }
    }
}

/// Display order of actions within a package.
///
/// Loaded from configuration so the order lives in data rather than in the
/// aggregation code. An action that shows up in pending tasks but is missing
/// from the list is reported as an integrity violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPriority {
    order: Vec<Action>,
}

impl ActionPriority {
    pub fn new(order: Vec<Action>) -> ApprovalResult<Self> {
        if order.is_empty() {
            return Err(ApprovalError::configuration(
                "action priority list must not be empty",
            ));
        }

        for (index, action) in order.iter().enumerate() {
            if order[..index].contains(action) {
                return Err(ApprovalError::configuration(format!(
                    "action '{action}' appears more than once in the priority list"
                )));
            }
        }

        Ok(Self { order })
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> ApprovalResult<Self> {
        let order = names
            .iter()
            .map(|name| {
                name.as_ref()
                    .parse::<Action>()
                    .map_err(ApprovalError::configuration)
            })
            .collect::<ApprovalResult<Vec<_>>>()?;

        Self::new(order)
    }

    pub fn rank(&self, action: Action) -> ApprovalResult<usize> {
        self.order
            .iter()
            .position(|candidate| *candidate == action)
            .ok_or_else(|| {
                ApprovalError::integrity(format!(
                    "action '{action}' has no configured display priority"
                ))
            })
    }

    pub fn actions(&self) -> &[Action] {
        &self.order
    }
}

impl Default for ActionPriority {
    fn default() -> Self {
        Self {
            order: Action::ALL.to_vec(),
        }
    }
}
