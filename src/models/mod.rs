//! # Domain Models
//!
//! Task records and the raw rows returned by the task store queries.

pub mod action;
pub mod task;

pub use action::{Action, ActionPriority};
pub use task::{AgentPackageCountRow, PendingTaskGroupRow, TargetVersion, TaskRecord};
