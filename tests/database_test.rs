//! PostgreSQL-backed store tests.
//!
//! Each test gets a fresh database from `#[sqlx::test]`. They need
//! `DATABASE_URL` and are ignored by default:
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/pending_approval_test cargo test -- --ignored
//! ```

use pending_approval::aggregation::{AgentAggregator, AggregationSettings, PendingTaskAggregator};
use pending_approval::forms::TaskKey;
use pending_approval::models::{Action, TargetVersion};
use pending_approval::selection::{Selection, SelectionPredicateBuilder};
use pending_approval::store::{PgTaskStore, TaskStore};
use sqlx::PgPool;

async fn seed(pool: &PgPool) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO package (name) VALUES ('pkgA'), ('pkgB'), ('pkgC')")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO agent (name) VALUES ('agentX'), ('agentY'), ('agentZ')")
        .execute(pool)
        .await?;

    let tasks: [(&str, &str, &str, Option<&str>, bool); 7] = [
        ("pkgA", "agentX", "install", Some("2.0"), false),
        ("pkgA", "agentY", "install", Some("2.0"), false),
        ("pkgA", "agentX", "remove", None, false),
        ("pkgB", "agentY", "purge", None, false),
        ("pkgB", "agentZ", "update", Some("1.10"), false),
        ("pkgB", "agentZ", "update", Some("1.9"), false),
        ("pkgC", "agentZ", "install", Some("3.0"), true),
    ];
    for (package, agent, action, version, approved) in tasks {
        sqlx::query(
            "INSERT INTO task (package, agent, action, to_version, approved) \
             SELECT p.id, a.id, $3, $4, $5 FROM package p, agent a \
             WHERE p.name = $1 AND a.name = $2",
        )
        .bind(package)
        .bind(agent)
        .bind(action)
        .bind(version)
        .bind(approved)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_pending_task_groups(pool: PgPool) -> sqlx::Result<()> {
    seed(&pool).await?;
    let store = PgTaskStore::new(pool);

    let mut rows = store.pending_task_groups().await.unwrap();
    rows.sort_by(|a, b| {
        (a.package.as_str(), a.action.as_str(), a.target_version.as_deref()).cmp(&(
            b.package.as_str(),
            b.action.as_str(),
            b.target_version.as_deref(),
        ))
    });

    let summary: Vec<(&str, &str, Option<&str>, i64)> = rows
        .iter()
        .map(|r| {
            (
                r.package.as_str(),
                r.action.as_str(),
                r.target_version.as_deref(),
                r.agent_count,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("pkgA", "install", Some("2.0"), 2),
            ("pkgA", "remove", None, 2),
            ("pkgB", "purge", None, 2),
            ("pkgB", "update", Some("1.10"), 2),
            ("pkgB", "update", Some("1.9"), 2),
        ]
    );
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_aggregated_package_view(pool: PgPool) -> sqlx::Result<()> {
    seed(&pool).await?;
    let store = PgTaskStore::new(pool);
    let settings = AggregationSettings::default();

    let groups = PendingTaskAggregator::new(&store, &settings)
        .aggregate()
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].package, "pkgA");
    assert_eq!(groups[0].actions[0].action, Action::Install);
    assert_eq!(groups[0].actions[1].action, Action::Remove);
    assert_eq!(
        groups[1].actions[0].versions,
        vec![TargetVersion::version("1.10"), TargetVersion::version("1.9")]
    );
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_agents_matching_selection(pool: PgPool) -> sqlx::Result<()> {
    seed(&pool).await?;
    let store = PgTaskStore::new(pool);

    let selection: Selection = [
        TaskKey::new("pkgA", Action::Remove, TargetVersion::NotApplicable),
        TaskKey::new("pkgB", Action::Update, TargetVersion::version("1.9")),
    ]
    .into_iter()
    .collect();
    let predicate = SelectionPredicateBuilder::build(&selection);

    let agents = AgentAggregator::new(&store)
        .aggregate(predicate.as_ref())
        .await
        .unwrap();

    let listed: Vec<(&str, i64)> = agents
        .iter()
        .map(|a| (a.agent.as_str(), a.package_count))
        .collect();
    // agentZ's approved pkgC task does not count
    assert_eq!(listed, vec![("agentX", 1), ("agentZ", 1)]);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_selection_with_no_version_does_not_match_versions(pool: PgPool) -> sqlx::Result<()> {
    seed(&pool).await?;
    let store = PgTaskStore::new(pool);

    let selection: Selection = [TaskKey::new(
        "pkgA",
        Action::Install,
        TargetVersion::NotApplicable,
    )]
    .into_iter()
    .collect();
    let predicate = SelectionPredicateBuilder::build(&selection);

    let agents = AgentAggregator::new(&store)
        .aggregate(predicate.as_ref())
        .await
        .unwrap();
    assert!(agents.is_empty());
    Ok(())
}
