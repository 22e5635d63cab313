//! # Selection Flow
//!
//! Two-stage approval workflow. Stage one picks package/action/version
//! triples, stage two optionally narrows the approval to a subset of the
//! affected agents. The transition decision is a pure function of the
//! submitted flags and the persisted session flag; the controller wraps it
//! with aggregation, session storage and the commit hook.
//!
//! Sessions that are never submitted expire after the configured
//! time-to-live and are swept at the start of every round.

pub mod commit;
pub mod controller;
pub mod session;
pub mod states;

pub use commit::{ApprovalCommitter, ApprovalRequest, CommitReceipt, NoopApprovalCommitter};
pub use controller::{FlowResponse, FlowTransition, SelectionFlowController, SubmissionFlags};
pub use session::{
    FlowSession, FlowSessionStore, InMemoryFlowSessionStore, DEFAULT_SESSION_TTL,
};
pub use states::FlowState;
