//! # View Model
//!
//! Ordered rows plus identifiers handed to whatever renders the approval form.
//! No markup is produced here.

use crate::aggregation::{AgentGroup, PackageGroup};
use crate::forms::{AgentKey, TaskKey};
use crate::models::{Action, TargetVersion};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRow {
    pub target_version: TargetVersion,
    pub label: String,
    /// Checkbox field name
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    pub action: Action,
    pub versions: Vec<VersionRow>,
}

impl ActionRow {
    pub fn row_span(&self) -> usize {
        self.versions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRow {
    pub package: String,
    pub agent_count: i64,
    pub actions: Vec<ActionRow>,
}

impl PackageRow {
    pub fn row_span(&self) -> usize {
        self.actions.iter().map(ActionRow::row_span).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingPackagesView {
    pub packages: Vec<PackageRow>,
}

impl PendingPackagesView {
    pub fn from_groups(groups: &[PackageGroup], no_version_label: &str) -> Self {
        let packages = groups
            .iter()
            .map(|group| PackageRow {
                package: group.package.clone(),
                agent_count: group.agent_count,
                actions: group
                    .actions
                    .iter()
                    .map(|action| ActionRow {
                        action: action.action,
                        versions: action
                            .versions
                            .iter()
                            .map(|version| VersionRow {
                                target_version: version.clone(),
                                label: version.label(no_version_label).to_string(),
                                key: TaskKey::new(
                                    group.package.clone(),
                                    action.action,
                                    version.clone(),
                                )
                                .encode(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { packages }
    }

    /// Every offered triple, in display order
    pub fn task_keys(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.packages.iter().flat_map(|package| {
            package.actions.iter().flat_map(move |action| {
                action.versions.iter().map(move |version| {
                    TaskKey::new(
                        package.package.clone(),
                        action.action,
                        version.target_version.clone(),
                    )
                })
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRow {
    pub agent: String,
    pub package_count: i64,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentSelectionView {
    pub agents: Vec<AgentRow>,
}

impl AgentSelectionView {
    pub fn from_groups(groups: &[AgentGroup]) -> Self {
        Self {
            agents: groups
                .iter()
                .map(|group| AgentRow {
                    agent: group.agent.clone(),
                    package_count: group.package_count,
                    key: AgentKey::new(group.agent.clone()).encode(),
                })
                .collect(),
        }
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.agents.iter().any(|row| row.agent == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::ActionGroup;

    #[test]
    fn test_package_view_rows_and_keys() {
        let groups = vec![PackageGroup {
            package: "pkgA".to_string(),
            agent_count: 2,
            actions: vec![
                ActionGroup {
                    action: Action::Install,
                    versions: vec![TargetVersion::version("2.0"), TargetVersion::version("1.0")],
                },
                ActionGroup {
                    action: Action::Remove,
                    versions: vec![TargetVersion::NotApplicable],
                },
            ],
        }];

        let view = PendingPackagesView::from_groups(&groups, "N/A");
        let package = &view.packages[0];
        assert_eq!(package.row_span(), 3);
        assert_eq!(package.actions[0].row_span(), 2);
        assert_eq!(package.actions[1].versions[0].label, "N/A");
        assert_eq!(package.actions[1].versions[0].key, "706b6741_remove_-");

        let keys: Vec<TaskKey> = view.task_keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(
            keys[0],
            TaskKey::new("pkgA", Action::Install, TargetVersion::version("2.0"))
        );
    }

    #[test]
    fn test_agent_view() {
        let view = AgentSelectionView::from_groups(&[AgentGroup {
            agent: "ab".to_string(),
            package_count: 3,
        }]);
        assert_eq!(view.agents[0].key, "agent_6162");
        assert!(view.contains("ab"));
        assert!(!view.contains("cd"));
    }
}
