use super::TaskStore;
use crate::error::ApprovalResult;
use crate::models::{AgentPackageCountRow, PendingTaskGroupRow, TaskRecord};
use crate::query_builder::WhereClause;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Task store held in memory, with the same counting rules as the SQL store
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = TaskRecord>) -> Self {
        Self {
            tasks: RwLock::new(tasks.into_iter().collect()),
        }
    }

    pub fn insert(&self, task: TaskRecord) {
        self.tasks.write().push(task);
    }

    /// Mark every task of `package` on `agent` approved, returning how many changed
    pub fn approve(&self, package: &str, agent: &str) -> usize {
        let mut tasks = self.tasks.write();
        let mut changed = 0;
        for task in tasks
            .iter_mut()
            .filter(|t| !t.approved && t.package == package && t.agent == agent)
        {
            task.approved = true;
            changed += 1;
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn pending_task_groups(&self) -> ApprovalResult<Vec<PendingTaskGroupRow>> {
        let tasks = self.tasks.read();
        let pending = tasks.iter().filter(|t| !t.approved);

        let mut agents_per_package: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut groups = BTreeSet::new();
        for task in pending {
            agents_per_package
                .entry(&task.package)
                .or_default()
                .insert(&task.agent);
            groups.insert((&task.package, task.action, &task.target_version));
        }

        Ok(groups
            .into_iter()
            .map(|(package, action, target_version)| PendingTaskGroupRow {
                package: package.clone(),
                action: action.as_str().to_string(),
                target_version: target_version.as_version().map(str::to_string),
                agent_count: agents_per_package
                    .get(package.as_str())
                    .map_or(0, |agents| agents.len() as i64),
            })
            .collect())
    }

    async fn agents_matching(
        &self,
        predicate: &WhereClause,
    ) -> ApprovalResult<Vec<AgentPackageCountRow>> {
        let tasks = self.tasks.read();

        let matching: BTreeSet<&str> = tasks
            .iter()
            .filter(|t| !t.approved && predicate.matches(t))
            .map(|t| t.agent.as_str())
            .collect();

        let mut packages_per_agent: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for task in tasks
            .iter()
            .filter(|t| !t.approved && matching.contains(t.agent.as_str()))
        {
            packages_per_agent
                .entry(&task.agent)
                .or_default()
                .insert(&task.package);
        }

        Ok(packages_per_agent
            .into_iter()
            .map(|(agent, packages)| AgentPackageCountRow {
                agent: agent.to_string(),
                package_count: packages.len() as i64,
            })
            .collect())
    }
}
