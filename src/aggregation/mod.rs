//! # Aggregation
//!
//! Display-ordered views over pending tasks: packages with their actions and
//! target versions, and the agents affected by a selection.

pub mod agents;
pub mod natural_sort;
pub mod pending_tasks;

use crate::models::ActionPriority;

pub use agents::{AgentAggregator, AgentGroup};
pub use natural_sort::natural_cmp;
pub use pending_tasks::{ActionGroup, PackageGroup, PendingTaskAggregator};

pub const DEFAULT_NO_VERSION_LABEL: &str = "N/A";

/// Ordering inputs shared by the aggregators and views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSettings {
    pub action_priority: ActionPriority,
    /// Label shown for, and sorted as, the no-version marker
    pub no_version_label: String,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            action_priority: ActionPriority::default(),
            no_version_label: DEFAULT_NO_VERSION_LABEL.to_string(),
        }
    }
}
