use super::natural_sort::natural_cmp;
use super::AggregationSettings;
use crate::error::ApprovalResult;
use crate::models::{Action, PendingTaskGroupRow, TargetVersion};
use crate::store::TaskStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Pending work for one package, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageGroup {
    pub package: String,
    /// Distinct agents with any unapproved task for the package
    pub agent_count: i64,
    pub actions: Vec<ActionGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionGroup {
    pub action: Action,
    pub versions: Vec<TargetVersion>,
}

impl PackageGroup {
    /// Number of (action, version) rows under this package
    pub fn row_count(&self) -> usize {
        self.actions.iter().map(|a| a.versions.len()).sum()
    }
}

#[derive(Debug, Default)]
struct PackageAccumulator {
    agent_count: i64,
    actions: BTreeMap<usize, (Action, BTreeSet<TargetVersion>)>,
}

/// Groups unapproved tasks by package, action and target version
pub struct PendingTaskAggregator<'a> {
    store: &'a dyn TaskStore,
    settings: &'a AggregationSettings,
}

impl<'a> PendingTaskAggregator<'a> {
    pub fn new(store: &'a dyn TaskStore, settings: &'a AggregationSettings) -> Self {
        Self { store, settings }
    }

    pub async fn aggregate(&self) -> ApprovalResult<Vec<PackageGroup>> {
        let rows = self.store.pending_task_groups().await?;
        let groups = group_rows(rows, self.settings)?;
        debug!(packages = groups.len(), "Aggregated pending tasks");
        Ok(groups)
    }
}

/// Order raw group rows for display.
///
/// Packages by agent count descending then name ascending; actions by the
/// configured priority; versions by natural order descending, comparing the
/// no-version marker by its label.
pub fn group_rows(
    rows: Vec<PendingTaskGroupRow>,
    settings: &AggregationSettings,
) -> ApprovalResult<Vec<PackageGroup>> {
    let mut packages: BTreeMap<String, PackageAccumulator> = BTreeMap::new();

    for row in rows {
        let action = Action::from_stored(&row.action)?;
        let rank = settings.action_priority.rank(action)?;

        let package = packages.entry(row.package).or_default();
        // Counts come from one query per row and may disagree under concurrent writes
        package.agent_count = package.agent_count.max(row.agent_count);
        package
            .actions
            .entry(rank)
            .or_insert_with(|| (action, BTreeSet::new()))
            .1
            .insert(TargetVersion::from(row.target_version));
    }

    let label = settings.no_version_label.as_str();
    let mut groups: Vec<PackageGroup> = packages
        .into_iter()
        .map(|(package, accumulator)| PackageGroup {
            package,
            agent_count: accumulator.agent_count,
            actions: accumulator
                .actions
                .into_values()
                .map(|(action, versions)| {
                    let mut versions: Vec<TargetVersion> = versions.into_iter().collect();
                    versions.sort_by(|a, b| compare_versions_desc(a, b, label));
                    ActionGroup { action, versions }
                })
                .collect(),
        })
        .collect();

    groups.sort_by(|a, b| {
        b.agent_count
            .cmp(&a.agent_count)
            .then_with(|| a.package.cmp(&b.package))
    });

    Ok(groups)
}

fn compare_versions_desc(a: &TargetVersion, b: &TargetVersion, label: &str) -> Ordering {
    natural_cmp(b.label(label), a.label(label)).then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(package: &str, action: &str, version: Option<&str>, agents: i64) -> PendingTaskGroupRow {
        PendingTaskGroupRow {
            package: package.to_string(),
            action: action.to_string(),
            target_version: version.map(str::to_string),
            agent_count: agents,
        }
    }

    #[test]
    fn test_packages_ordered_by_agent_count_then_name() {
        let groups = group_rows(
            vec![
                row("zsh", "install", Some("5.9"), 3),
                row("bash", "update", Some("5.2"), 1),
                row("Vim", "install", Some("9.0"), 3),
                row("apt", "remove", None, 3),
            ],
            &AggregationSettings::default(),
        )
        .unwrap();

        let names: Vec<&str> = groups.iter().map(|g| g.package.as_str()).collect();
        assert_eq!(names, vec!["Vim", "apt", "zsh", "bash"]);
    }

    #[test]
    fn test_actions_follow_priority_and_versions_sort_naturally() {
        let groups = group_rows(
            vec![
                row("pkg", "purge", None, 2),
                row("pkg", "install", Some("1.9"), 2),
                row("pkg", "install", None, 2),
                row("pkg", "install", Some("1.10"), 2),
                row("pkg", "configure", Some(""), 2),
            ],
            &AggregationSettings::default(),
        )
        .unwrap();

        let pkg = &groups[0];
        let actions: Vec<Action> = pkg.actions.iter().map(|a| a.action).collect();
        assert_eq!(actions, vec![Action::Install, Action::Configure, Action::Purge]);
        assert_eq!(
            pkg.actions[0].versions,
            vec![
                TargetVersion::NotApplicable,
                TargetVersion::version("1.10"),
                TargetVersion::version("1.9"),
            ]
        );
        assert_eq!(pkg.row_count(), 5);
    }

    #[test]
    fn test_no_version_label_participates_in_ordering() {
        let settings = AggregationSettings {
            no_version_label: "0".to_string(),
            ..AggregationSettings::default()
        };
        let groups = group_rows(
            vec![row("pkg", "install", None, 1), row("pkg", "install", Some("1"), 1)],
            &settings,
        )
        .unwrap();

        assert_eq!(
            groups[0].actions[0].versions,
            vec![TargetVersion::version("1"), TargetVersion::NotApplicable]
        );
    }

    #[test]
    fn test_unknown_action_is_integrity_violation() {
        let err = group_rows(
            vec![row("pkg", "downgrade", None, 1)],
            &AggregationSettings::default(),
        )
        .unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_action_without_priority_is_integrity_violation() {
        let settings = AggregationSettings {
            action_priority: crate::models::ActionPriority::new(vec![Action::Install]).unwrap(),
            ..AggregationSettings::default()
        };
        let err = group_rows(vec![row("pkg", "remove", None, 1)], &settings).unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_example_from_two_agents() {
        let groups = group_rows(
            vec![
                row("pkgA", "remove", None, 2),
                row("pkgA", "install", Some("2.0"), 2),
            ],
            &AggregationSettings::default(),
        )
        .unwrap();

        assert_eq!(
            groups,
            vec![PackageGroup {
                package: "pkgA".to_string(),
                agent_count: 2,
                actions: vec![
                    ActionGroup {
                        action: Action::Install,
                        versions: vec![TargetVersion::version("2.0")],
                    },
                    ActionGroup {
                        action: Action::Remove,
                        versions: vec![TargetVersion::NotApplicable],
                    },
                ],
            }]
        );
    }
}
