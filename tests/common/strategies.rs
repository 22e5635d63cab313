use pending_approval::forms::TaskKey;
use pending_approval::models::{Action, TargetVersion, TaskRecord};
use proptest::prelude::*;
use proptest::sample::select;

/// Arbitrary Unicode text, including empty strings and separator characters
pub fn free_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("_".to_string()),
        Just("-".to_string()),
        Just("agent_".to_string()),
        any::<String>(),
        "[a-z_\\-.]{0,12}",
    ]
}

pub fn action_strategy() -> impl Strategy<Value = Action> {
    select(Action::ALL.to_vec())
}

pub fn target_version_strategy() -> impl Strategy<Value = TargetVersion> {
    prop::option::of(free_text_strategy()).prop_map(TargetVersion::from)
}

pub fn task_key_strategy() -> impl Strategy<Value = TaskKey> {
    (free_text_strategy(), action_strategy(), target_version_strategy())
        .prop_map(|(package, action, version)| TaskKey::new(package, action, version))
}

/// Small name pools so generated tasks share packages and agents
fn package_name_strategy() -> impl Strategy<Value = String> {
    select(vec!["pkgA", "pkgB", "pkgC", "libfoo", "Vim"]).prop_map(str::to_string)
}

fn agent_name_strategy() -> impl Strategy<Value = String> {
    select(vec!["agentX", "agentY", "agentZ", "web-01", "db-01"]).prop_map(str::to_string)
}

fn small_version_strategy() -> impl Strategy<Value = TargetVersion> {
    prop::option::of(select(vec!["", "1.9", "1.10", "2.0", "2.0.1", "10.0"]))
        .prop_map(|version| TargetVersion::from(version.map(str::to_string)))
}

pub fn task_record_strategy() -> impl Strategy<Value = TaskRecord> {
    (
        package_name_strategy(),
        agent_name_strategy(),
        action_strategy(),
        small_version_strategy(),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(package, agent, action, target_version, approved)| TaskRecord {
            package,
            agent,
            action,
            target_version,
            approved,
        })
}

pub fn task_records_strategy() -> impl Strategy<Value = Vec<TaskRecord>> {
    prop::collection::vec(task_record_strategy(), 0..40)
}
