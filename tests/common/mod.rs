#![allow(dead_code)]

pub mod strategies;

use pending_approval::models::{Action, TargetVersion, TaskRecord};
use pending_approval::store::InMemoryTaskStore;

/// Fleet used by the flow tests:
///
/// | package | agent  | action  | version |
/// |---------|--------|---------|---------|
/// | pkgA    | agentX | install | 2.0     |
/// | pkgA    | agentY | install | 2.0     |
/// | pkgA    | agentX | remove  | -       |
/// | pkgB    | agentY | purge   | -       |
/// | pkgB    | agentZ | update  | 1.10    |
/// | pkgB    | agentZ | update  | 1.9     |
pub fn sample_tasks() -> Vec<TaskRecord> {
    vec![
        TaskRecord::pending("pkgA", "agentX", Action::Install, TargetVersion::version("2.0")),
        TaskRecord::pending("pkgA", "agentY", Action::Install, TargetVersion::version("2.0")),
        TaskRecord::pending("pkgA", "agentX", Action::Remove, TargetVersion::NotApplicable),
        TaskRecord::pending("pkgB", "agentY", Action::Purge, TargetVersion::NotApplicable),
        TaskRecord::pending("pkgB", "agentZ", Action::Update, TargetVersion::version("1.10")),
        TaskRecord::pending("pkgB", "agentZ", Action::Update, TargetVersion::version("1.9")),
    ]
}

pub fn sample_store() -> InMemoryTaskStore {
    InMemoryTaskStore::with_tasks(sample_tasks())
}
