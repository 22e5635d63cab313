use super::keys::{AgentKey, TaskKey};
use crate::error::ApprovalResult;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Checkbox asking to narrow the approval by agent before submitting
pub const FILTER_AGENTS_FIRST_FIELD: &str = "filter_agents_first";
/// Hidden flag carried between rounds once agent narrowing was requested
pub const FILTER_AGENTS_FIELD: &str = "filter_agents";

/// Flat field-name to values mapping as posted by a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = Self::new();
        for (name, value) in pairs {
            fields.insert(name, value);
        }
        fields
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// Mark a checkbox as ticked
    pub fn check(&mut self, name: impl Into<String>) {
        self.insert(name, "1");
    }

    /// Last posted value of a field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// A field counts as checked when its value is present, non-empty and not "0"
    pub fn is_checked(&self, name: &str) -> bool {
        self.value(name)
            .is_some_and(|value| !value.is_empty() && value != "0")
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A submission decoded into domain terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSubmission {
    pub filter_agents_first: bool,
    pub filter_agents: bool,
    pub selection: Selection,
    pub agents: BTreeSet<String>,
}

impl DecodedSubmission {
    /// Decode every checked task and agent identifier.
    ///
    /// Fields that are not identifiers (submit buttons, tokens) are ignored;
    /// identifiers that fail to decode abort the request.
    pub fn decode(fields: &FormFields) -> ApprovalResult<Self> {
        let mut decoded = Self {
            filter_agents_first: fields.is_checked(FILTER_AGENTS_FIRST_FIELD),
            filter_agents: fields.is_checked(FILTER_AGENTS_FIELD),
            ..Self::default()
        };

        for name in fields.names() {
            if name == FILTER_AGENTS_FIRST_FIELD || name == FILTER_AGENTS_FIELD {
                continue;
            }
            if !fields.is_checked(name) {
                continue;
            }

            if let Some(agent) = AgentKey::parse_field(name)? {
                decoded.agents.insert(agent.agent);
            } else if let Some(task) = TaskKey::parse_field(name)? {
                decoded.selection.insert(task);
            }
        }

        Ok(decoded)
    }
}
