//! # Task Store
//!
//! Read-only access to pending tasks. The engine issues exactly two queries per
//! aggregation pass and never writes.

pub mod memory;
pub mod postgres;

use crate::error::ApprovalResult;
use crate::models::{AgentPackageCountRow, PendingTaskGroupRow};
use crate::query_builder::WhereClause;
use async_trait::async_trait;

pub use memory::InMemoryTaskStore;
pub use postgres::PgTaskStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One row per distinct unapproved (package, action, target version), each
    /// carrying the number of distinct agents with any unapproved task for the package
    async fn pending_task_groups(&self) -> ApprovalResult<Vec<PendingTaskGroupRow>>;

    /// Agents with at least one unapproved task matching `predicate`, each with
    /// the number of distinct packages it has any unapproved task for
    async fn agents_matching(
        &self,
        predicate: &WhereClause,
    ) -> ApprovalResult<Vec<AgentPackageCountRow>>;
}
