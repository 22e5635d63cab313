use crate::error::ApprovalResult;
use crate::selection::Selection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Final output of the workflow: what to approve and, optionally, where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalRequest {
    pub selection: Selection,
    /// `None` when the operator did not narrow by agent
    pub agents: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    /// Whether any task was actually marked approved
    pub persisted: bool,
    pub tasks_selected: usize,
    pub committed_at: DateTime<Utc>,
}

/// Applies an approval request.
///
/// Extension point: what approving means (flagging tasks approved, kicking
/// off deployment) is decided by the implementation.
#[async_trait]
pub trait ApprovalCommitter: Send + Sync {
    async fn commit(&self, request: &ApprovalRequest) -> ApprovalResult<CommitReceipt>;
}

/// Reports success without changing any task.
///
/// No persistent approval behaviour is defined yet; this committer keeps the
/// workflow usable end to end and says so in every receipt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopApprovalCommitter;

#[async_trait]
impl ApprovalCommitter for NoopApprovalCommitter {
    async fn commit(&self, request: &ApprovalRequest) -> ApprovalResult<CommitReceipt> {
        let tasks_selected = request.selection.len();
        info!(
            tasks_selected,
            agents = ?request.agents.as_ref().map(BTreeSet::len),
            "Approval request received"
        );
        warn!("Approval commit is a no-op, no tasks were marked approved");

        Ok(CommitReceipt {
            persisted: false,
            tasks_selected,
            committed_at: Utc::now(),
        })
    }
}
