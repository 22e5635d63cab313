//! # Pending Approvals
//!
//! Command-line view of unapproved package tasks. Prints the package table, or
//! the agents affected by a set of selected rows, as a table or as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pending_approval::aggregation::{AgentAggregator, PendingTaskAggregator};
use pending_approval::config::ConfigManager;
use pending_approval::forms::TaskKey;
use pending_approval::logging::init_structured_logging;
use pending_approval::selection::{Selection, SelectionPredicateBuilder};
use pending_approval::store::PgTaskStore;
use pending_approval::view::{AgentSelectionView, PendingPackagesView};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pending-approvals")]
#[command(about = "Inspect package tasks waiting for approval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: layered lookup in $APPROVAL_CONFIG_DIR or ./config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List pending packages with their actions and target versions
    Packages,

    /// List agents affected by the selected rows
    Agents {
        /// Row identifier as printed by `packages`, repeatable
        #[arg(short, long = "select", required = true)]
        select: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path),
        None => ConfigManager::load(),
    }
    .context("failed to load configuration")?;
    let config = manager.config();

    init_structured_logging(&config.logging);
    info!(
        environment = manager.environment(),
        "Starting pending-approvals"
    );

    let settings = config.aggregation_settings()?;
    let store = PgTaskStore::connect(&config.database)
        .await
        .context("failed to connect to the task database")?;

    match cli.command {
        Commands::Packages => {
            let groups = PendingTaskAggregator::new(&store, &settings)
                .aggregate()
                .await?;
            let view = PendingPackagesView::from_groups(&groups, &settings.no_version_label);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Table => print_packages(&view),
            }
        }
        Commands::Agents { select } => {
            let selection = select
                .iter()
                .map(|key| TaskKey::decode(key).with_context(|| format!("invalid row identifier '{key}'")))
                .collect::<Result<Selection>>()?;
            let predicate = SelectionPredicateBuilder::build(&selection);
            let groups = AgentAggregator::new(&store)
                .aggregate(predicate.as_ref())
                .await?;
            let view = AgentSelectionView::from_groups(&groups);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Table => print_agents(&view),
            }
        }
    }

    Ok(())
}

fn print_packages(view: &PendingPackagesView) {
    if view.is_empty() {
        println!("No pending package tasks");
        return;
    }

    println!(
        "{:<32} {:>7}  {:<10} {:<20} ID",
        "PACKAGE", "AGENTS", "ACTION", "VERSION"
    );
    for package in &view.packages {
        let mut first_package_row = true;
        for action in &package.actions {
            let mut first_action_row = true;
            for version in &action.versions {
                let (name, agents) = if first_package_row {
                    (package.package.as_str(), package.agent_count.to_string())
                } else {
                    ("", String::new())
                };
                let action_name = if first_action_row { action.action.as_str() } else { "" };
                println!(
                    "{name:<32} {agents:>7}  {action_name:<10} {:<20} {}",
                    version.label, version.key
                );
                first_package_row = false;
                first_action_row = false;
            }
        }
    }
}

fn print_agents(view: &AgentSelectionView) {
    if view.agents.is_empty() {
        println!("No agents match the selection");
        return;
    }

    println!("{:<40} {:>8}  ID", "AGENT", "PACKAGES");
    for agent in &view.agents {
        println!(
            "{:<40} {:>8}  {}",
            agent.agent, agent.package_count, agent.key
        );
    }
}
