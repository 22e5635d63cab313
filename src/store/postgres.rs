use super::TaskStore;
use crate::config::DatabaseSettings;
use crate::error::{ApprovalError, ApprovalResult};
use crate::models::{AgentPackageCountRow, PendingTaskGroupRow};
use crate::query_builder::{BoundQuery, QueryBuilder, WhereClause};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Instant;
use tracing::debug;

const PACKAGE_AGENT_COUNT: &str = "(SELECT COUNT(DISTINCT t2.agent) FROM task t2 \
     WHERE t2.approved = FALSE AND t2.package = t1.package)";

const AGENT_PACKAGE_COUNT: &str = "(SELECT COUNT(DISTINCT t1.package) FROM task t1 \
     WHERE t1.agent = a.id AND t1.approved = FALSE)";

/// Task store over the `package`, `agent` and `task` tables
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(settings: &DatabaseSettings) -> ApprovalResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout())
            .connect(&settings.url)
            .await
            .map_err(|e| ApprovalError::data_access("connect", e))?;

        Ok(Self { pool })
    }

    pub fn pending_task_groups_query() -> BoundQuery {
        let agent_count = format!("{PACKAGE_AGENT_COUNT} AS agent_count");
        QueryBuilder::new("task t1")
            .select(&[
                "p.name AS package",
                "t1.action AS action",
                "t1.to_version AS target_version",
                agent_count.as_str(),
            ])
            .inner_join("package p", "p.id = t1.package")
            .where_raw("t1.approved = FALSE")
            .group_by(&["t1.package", "p.name", "t1.action", "t1.to_version"])
            .order_desc("agent_count")
            .order_asc("p.name")
            .build()
    }

    pub fn agents_matching_query(predicate: &WhereClause) -> BoundQuery {
        let matching_agents = QueryBuilder::new("task t2")
            .select(&["t2.agent"])
            .inner_join("package p", "p.id = t2.package")
            .where_raw("t2.approved = FALSE")
            .where_clause(predicate.clone());

        let package_count = format!("{AGENT_PACKAGE_COUNT} AS package_count");
        QueryBuilder::new("agent a")
            .select(&["a.name AS agent", package_count.as_str()])
            .where_in_subquery("a.id", matching_agents)
            .order_desc("package_count")
            .order_asc("a.name")
            .build()
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn pending_task_groups(&self) -> ApprovalResult<Vec<PendingTaskGroupRow>> {
        let query = Self::pending_task_groups_query();
        let start = Instant::now();

        let rows = query
            .query_as::<PendingTaskGroupRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApprovalError::data_access("pending_task_groups", e))?;

        debug!(
            rows = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched pending task groups"
        );
        Ok(rows)
    }

    async fn agents_matching(
        &self,
        predicate: &WhereClause,
    ) -> ApprovalResult<Vec<AgentPackageCountRow>> {
        let query = Self::agents_matching_query(predicate);
        debug!(
            sql = %query.sql,
            parameters = query.parameters.len(),
            "Querying agents for selection"
        );
        let start = Instant::now();

        let rows = query
            .query_as::<AgentPackageCountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApprovalError::data_access("agents_matching", e))?;

        debug!(
            rows = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched matching agents"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::Column;

    #[test]
    fn test_pending_task_groups_sql() {
        let query = PgTaskStore::pending_task_groups_query();
        assert!(query.sql.starts_with("SELECT p.name AS package, t1.action AS action"));
        assert!(query.sql.contains("WHERE t1.approved = FALSE"));
        assert!(query.sql.contains("GROUP BY t1.package, p.name, t1.action, t1.to_version"));
        assert!(query.sql.ends_with("ORDER BY agent_count DESC, p.name ASC"));
        assert!(query.parameters.is_empty());
    }

    #[test]
    fn test_agents_matching_sql_binds_predicate() {
        let predicate = WhereClause::and(vec![
            WhereClause::eq(Column::Package, "o'reilly"),
            WhereClause::eq(Column::Action, "install"),
        ]);
        let query = PgTaskStore::agents_matching_query(&predicate);

        assert!(query.sql.contains(
            "WHERE a.id IN (SELECT t2.agent FROM task t2 INNER JOIN package p ON p.id = t2.package \
             WHERE t2.approved = FALSE AND (p.name = $1 AND t2.action = $2))"
        ));
        assert!(query.sql.ends_with("ORDER BY package_count DESC, a.name ASC"));
        assert!(!query.sql.contains("o'reilly"));
        assert_eq!(
            query.parameters.values(),
            &["o'reilly".to_string(), "install".to_string()]
        );
    }
}
