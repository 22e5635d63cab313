//! # Selection
//!
//! The set of package/action/version triples an operator has ticked, and its
//! translation into a task predicate.

use crate::forms::TaskKey;
use crate::models::{Action, TargetVersion};
use crate::query_builder::{Column, WhereClause};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

type ActionVersions = BTreeMap<Action, BTreeSet<TargetVersion>>;

/// Sparse `package -> action -> versions` map with a fixed iteration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    packages: BTreeMap<String, ActionVersions>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TaskKey) -> bool {
        self.packages
            .entry(key.package)
            .or_default()
            .entry(key.action)
            .or_default()
            .insert(key.target_version)
    }

    pub fn contains(&self, key: &TaskKey) -> bool {
        self.packages
            .get(&key.package)
            .and_then(|actions| actions.get(&key.action))
            .is_some_and(|versions| versions.contains(&key.target_version))
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Number of selected triples
    pub fn len(&self) -> usize {
        self.packages
            .values()
            .flat_map(|actions| actions.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.packages.iter().flat_map(|(package, actions)| {
            actions.iter().flat_map(move |(action, versions)| {
                versions
                    .iter()
                    .map(move |version| TaskKey::new(package.clone(), *action, version.clone()))
            })
        })
    }

    /// Keep only the triples accepted by `keep`, returning the ones removed
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<TaskKey>
    where
        F: FnMut(&TaskKey) -> bool,
    {
        let (kept, removed): (Vec<TaskKey>, Vec<TaskKey>) = self.keys().partition(|key| keep(key));
        self.packages.clear();
        for key in kept {
            self.insert(key);
        }
        removed
    }
}

impl FromIterator<TaskKey> for Selection {
    fn from_iter<I: IntoIterator<Item = TaskKey>>(iter: I) -> Self {
        let mut selection = Self::new();
        for key in iter {
            selection.insert(key);
        }
        selection
    }
}

/// Turns a [`Selection`] into a predicate over task rows.
///
/// The predicate does not include `approved = FALSE`; the agent query adds it.
pub struct SelectionPredicateBuilder;

impl SelectionPredicateBuilder {
    /// Build the predicate, or `None` for an empty selection.
    ///
    /// `None` means "match nothing": agents are only listed for an explicit
    /// choice of packages.
    pub fn build(selection: &Selection) -> Option<WhereClause> {
        if selection.is_empty() {
            debug!("Empty selection, no agent predicate built");
            return None;
        }

        let package_filters = selection
            .packages
            .iter()
            .map(|(package, actions)| {
                let action_filters = actions
                    .iter()
                    .map(|(action, versions)| Self::action_filter(*action, versions))
                    .collect();

                WhereClause::and(vec![
                    WhereClause::eq(Column::Package, package.clone()),
                    WhereClause::or(action_filters).into_condition(),
                ])
                .into_condition()
            })
            .collect();

        Some(WhereClause::or(package_filters))
    }

    fn action_filter(
        action: Action,
        versions: &BTreeSet<TargetVersion>,
    ) -> crate::query_builder::Condition {
        let mut version_filters = Vec::with_capacity(2);

        if versions.contains(&TargetVersion::NotApplicable) {
            version_filters.push(WhereClause::is_null(Column::TargetVersion));
        }

        let named: Vec<String> = versions
            .iter()
            .filter_map(|version| version.as_version().map(str::to_string))
            .collect();
        if !named.is_empty() {
            version_filters.push(WhereClause::in_values(Column::TargetVersion, named));
        }

        WhereClause::and(vec![
            WhereClause::eq(Column::Action, action.as_str()),
            WhereClause::or(version_filters).into_condition(),
        ])
        .into_condition()
    }
}
