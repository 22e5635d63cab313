//! # Form Plumbing
//!
//! Stable identifiers for every selectable task triple and agent, and decoding
//! of a posted form into a [`DecodedSubmission`].

pub mod fields;
pub mod keys;

pub use fields::{DecodedSubmission, FormFields, FILTER_AGENTS_FIELD, FILTER_AGENTS_FIRST_FIELD};
pub use keys::{AgentKey, TaskKey, AGENT_KEY_PREFIX, NO_VERSION_MARKER};
