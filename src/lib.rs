#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Pending Approval Core
//!
//! Engine behind the pending package task approval screen.
//!
//! ## Overview
//!
//! Managed agents accumulate package tasks (install, update, configure,
//! remove, purge) that an operator has to approve before they run. This crate
//! aggregates the unapproved tasks into a package/action/version table,
//! encodes every selectable row as a stable form identifier, narrows a
//! selection down to the affected agents, and drives the two-stage
//! select-then-filter workflow. Rendering is left to the caller.
//!
//! ## Module Organization
//!
//! - [`models`] - task records, actions and the raw query rows
//! - [`query_builder`] - predicate tree and its lowering to parameterized SQL
//! - [`store`] - task store trait with PostgreSQL and in-memory backends
//! - [`aggregation`] - package and agent aggregators
//! - [`forms`] - composite checkbox identifiers and submitted form decoding
//! - [`selection`] - selected triples and the agent filter predicate
//! - [`view`] - ordered rows handed to the renderer
//! - [`flow`] - two-stage selection workflow
//! - [`config`] - configuration loading
//! - [`error`] - structured error handling
//! - [`logging`] - tracing setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pending_approval::aggregation::{AggregationSettings, PendingTaskAggregator};
//! use pending_approval::config::DatabaseSettings;
//! use pending_approval::store::PgTaskStore;
//! use pending_approval::view::PendingPackagesView;
//!
//! # async fn example() -> pending_approval::ApprovalResult<()> {
//! let store = PgTaskStore::connect(&DatabaseSettings::default()).await?;
//! let settings = AggregationSettings::default();
//!
//! let groups = PendingTaskAggregator::new(&store, &settings).aggregate().await?;
//! let view = PendingPackagesView::from_groups(&groups, &settings.no_version_label);
//! for package in &view.packages {
//!     println!("{} ({} agents)", package.package, package.agent_count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                    # Unit tests
//! cargo test                          # Unit and integration tests
//! cargo test -- --ignored             # Database tests (needs DATABASE_URL)
//! ```

pub mod aggregation;
pub mod config;
pub mod error;
pub mod flow;
pub mod forms;
pub mod logging;
pub mod models;
pub mod query_builder;
pub mod selection;
pub mod store;
pub mod view;

pub use aggregation::{
    AgentAggregator, AgentGroup, AggregationSettings, PackageGroup, PendingTaskAggregator,
};
pub use config::{ApprovalConfig, ConfigManager};
pub use error::{ApprovalError, ApprovalResult};
pub use flow::{FlowResponse, FlowState, SelectionFlowController};
pub use forms::{AgentKey, DecodedSubmission, FormFields, TaskKey};
pub use models::{Action, ActionPriority, TargetVersion, TaskRecord};
pub use selection::{Selection, SelectionPredicateBuilder};
pub use store::{InMemoryTaskStore, PgTaskStore, TaskStore};
