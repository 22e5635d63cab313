use crate::error::ApprovalResult;
use crate::models::AgentPackageCountRow;
use crate::query_builder::WhereClause;
use crate::store::TaskStore;
use serde::Serialize;
use tracing::debug;

/// An agent offered for narrowing an approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentGroup {
    pub agent: String,
    /// Distinct packages with any unapproved task on this agent
    pub package_count: i64,
}

/// Lists agents affected by a selection predicate
pub struct AgentAggregator<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> AgentAggregator<'a> {
    pub fn new(store: &'a dyn TaskStore) -> Self {
        Self { store }
    }

    /// Agents matching `predicate`, most pending packages first.
    ///
    /// Without a predicate nothing was selected and no agents are returned.
    pub async fn aggregate(&self, predicate: Option<&WhereClause>) -> ApprovalResult<Vec<AgentGroup>> {
        let Some(predicate) = predicate else {
            debug!("No selection predicate, returning no agents");
            return Ok(Vec::new());
        };

        let rows = self.store.agents_matching(predicate).await?;
        let agents = order_agents(rows);
        debug!(agents = agents.len(), "Aggregated agents for selection");
        Ok(agents)
    }
}

/// Package count descending, then agent name ascending
pub fn order_agents(rows: Vec<AgentPackageCountRow>) -> Vec<AgentGroup> {
    let mut agents: Vec<AgentGroup> = rows
        .into_iter()
        .map(|row| AgentGroup {
            agent: row.agent,
            package_count: row.package_count,
        })
        .collect();

    agents.sort_by(|a, b| {
        b.package_count
            .cmp(&a.package_count)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;

    fn row(agent: &str, packages: i64) -> AgentPackageCountRow {
        AgentPackageCountRow {
            agent: agent.to_string(),
            package_count: packages,
        }
    }

    #[test]
    fn test_order_agents() {
        let agents = order_agents(vec![row("c", 1), row("b", 4), row("a", 1), row("B", 4)]);
        let names: Vec<&str> = agents.iter().map(|a| a.agent.as_str()).collect();
        assert_eq!(names, vec!["B", "b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_no_predicate_returns_no_agents() {
        let store = InMemoryTaskStore::new();
        let agents = AgentAggregator::new(&store).aggregate(None).await.unwrap();
        assert!(agents.is_empty());
    }
}
