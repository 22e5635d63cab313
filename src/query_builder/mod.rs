//! # Query Builder
//!
//! Structured predicates over pending tasks and their lowering to parameterized
//! PostgreSQL.
//!
//! ## Key Components
//!
//! - [`conditions`] - predicate tree (AND/OR groups, `=`, `IN`, `IS NULL` leaves)
//!   that can be lowered to SQL or evaluated against in-memory tasks
//! - [`builder`] - SELECT assembly with a single placeholder/parameter sequence
//!
//! Values never appear in SQL text. Each placeholder is numbered at the moment
//! its value is appended to [`BoundParameters`], so the two stay in lock-step
//! however deeply the predicate is nested.

pub mod builder;
pub mod conditions;

pub use builder::{BoundParameters, BoundQuery, QueryBuilder};
pub use conditions::{Column, Condition, LogicalOperator, WhereClause};
