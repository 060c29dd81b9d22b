// crates/forgecli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forgecore::{analyze, traverse, validate, NodeKind, Workflow};
use forgeruntime::{EditorSession, ForgeRuntime, RunOutcome, RuntimeConfig, SandboxEvent};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Onboarding workflow sandbox CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a workflow file for structural problems
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// Validate and simulate a workflow file
    Simulate {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Simulate even if validation finds problems
        #[arg(long)]
        force: bool,

        /// Simulation service URL (falls back to local simulation if unreachable)
        #[arg(short, long)]
        remote: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the execution order of a workflow file
    Preview {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// Write the starter workflow to a file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },

    /// List available automation actions
    Automations {
        /// Simulation service URL to query
        #[arg(short, long)]
        remote: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => {
            init_logging(false);
            validate_workflow(&file)?;
        }

        Commands::Simulate {
            file,
            force,
            remote,
            verbose,
        } => {
            init_logging(verbose);
            simulate_workflow(&file, force, remote).await?;
        }

        Commands::Preview { file } => {
            init_logging(false);
            preview_workflow(&file)?;
        }

        Commands::Init { output } => {
            init_logging(false);
            create_starter_workflow(&output)?;
        }

        Commands::Automations { remote } => {
            init_logging(false);
            list_automations(remote).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    Workflow::from_json(&json).with_context(|| format!("parsing {}", file.display()))
}

fn runtime_config(remote: Option<String>) -> RuntimeConfig {
    let config = RuntimeConfig::from_env();
    match remote {
        Some(url) => config.with_remote(url),
        None => config,
    }
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Edges: {}", workflow.edges.len());

    let issues = validate(&workflow.nodes, &workflow.edges);
    let analysis = analyze(&workflow.nodes, &workflow.edges);

    if !analysis.unreachable.is_empty() {
        println!("ℹ️  Not reachable from start: {}", analysis.unreachable.join(", "));
    }
    if analysis.has_cycle {
        println!("ℹ️  Workflow contains a cycle");
    }

    if issues.is_empty() {
        println!("✅ Workflow is valid");
        return Ok(());
    }

    println!("❌ {} issue(s):", issues.len());
    for issue in &issues {
        match (&issue.node_id, &issue.edge_id) {
            (Some(node), _) => println!("   • {} [node {}]", issue.message, node),
            (None, Some(edge)) => println!("   • {} [edge {}]", issue.message, edge),
            (None, None) => println!("   • {}", issue.message),
        }
    }

    anyhow::bail!("workflow has {} validation issue(s)", issues.len())
}

async fn simulate_workflow(file: &Path, force: bool, remote: Option<String>) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(file)?;
    let runtime = ForgeRuntime::with_config(&runtime_config(remote))?;
    let mut session = EditorSession::new(workflow);
    runtime.load_automations(&mut session).await;

    for node in &session.workflow().nodes {
        let missing = session.catalog().missing_params(node);
        if !missing.is_empty() {
            println!("⚠️  {} is missing parameters: {}", node.label(), missing.join(", "));
        }
    }

    let mut events = runtime.subscribe_events();
    let event_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event listener skipped {} event(s)", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match event {
                SandboxEvent::BackendFallback { backend, error, .. } => {
                    println!("↩️  {} backend unavailable ({}), simulated locally", backend, error);
                }
                SandboxEvent::RunCompleted {
                    steps,
                    warnings,
                    duration_ms,
                    ..
                } => {
                    println!(
                        "✨ Simulated {} step(s), {} warning(s) in {}ms",
                        steps, warnings, duration_ms
                    );
                }
                _ => {}
            }
        }
    });

    let outcome = runtime.run(&mut session, force).await;

    // Dropping the runtime closes the event bus so the listener drains and exits
    drop(runtime);
    event_task.await?;

    println!();
    for line in session.log() {
        println!("  {}", line);
    }

    match outcome? {
        RunOutcome::Blocked(issues) => {
            anyhow::bail!("simulation blocked by {} validation issue(s)", issues.len())
        }
        RunOutcome::Completed(_) => Ok(()),
    }
}

fn preview_workflow(file: &Path) -> Result<()> {
    let workflow = load_workflow(file)?;
    let ordered = traverse(&workflow.nodes, &workflow.edges);

    if ordered.is_empty() {
        println!("No start node: nothing to preview");
        return Ok(());
    }

    println!("📋 Execution order:");
    for (index, node) in ordered.iter().enumerate() {
        println!("  {}. {}  (step {} of {})", index + 1, node.label(), index + 1, ordered.len());
    }

    Ok(())
}

fn create_starter_workflow(output: &Path) -> Result<()> {
    let workflow = Workflow::starter();
    std::fs::write(output, workflow.to_json_pretty()?)?;

    println!("✨ Created starter workflow: {}", output.display());
    println!();
    println!("Node kinds you can add:");
    for kind in NodeKind::ALL {
        println!("  • {:<10} {}", kind.as_str(), kind.hint());
    }
    println!();
    println!("Simulate it with:");
    println!("  forge simulate --file {}", output.display());

    Ok(())
}

async fn list_automations(remote: Option<String>) -> Result<()> {
    let runtime = ForgeRuntime::with_config(&runtime_config(remote))?;
    let mut session = EditorSession::new(Workflow::new());
    runtime.load_automations(&mut session).await;

    let catalog = session.catalog();
    if catalog.is_empty() {
        println!("No automation actions available");
        return Ok(());
    }

    println!("📦 Automation actions:");
    for action in catalog.actions() {
        println!("  • {} ({})", action.label, action.id);
        if !action.params.is_empty() {
            println!("    params: {}", action.params.join(", "));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgecore::Position;

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "forge",
            "simulate",
            "--file",
            "flow.json",
            "--force",
            "--remote",
            "http://localhost:3000",
        ])
        .unwrap();

        match cli.command {
            Commands::Simulate {
                file,
                force,
                remote,
                verbose,
            } => {
                assert_eq!(file, PathBuf::from("flow.json"));
                assert!(force);
                assert!(!verbose);
                assert_eq!(remote.as_deref(), Some("http://localhost:3000"));
            }
            _ => panic!("expected simulate command"),
        }
    }

    #[test]
    fn test_init_writes_loadable_workflow() {
        let path = std::env::temp_dir().join(format!("forge-init-{}.json", forgecore::short_id()));

        create_starter_workflow(&path).unwrap();
        let workflow = load_workflow(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(workflow.nodes.len(), 3);
        assert!(validate(&workflow.nodes, &workflow.edges).is_empty());
    }

    #[test]
    fn test_validate_fails_on_invalid_file() {
        let path = std::env::temp_dir().join(format!("forge-bad-{}.json", forgecore::short_id()));
        let mut workflow = Workflow::new();
        workflow.add_node(NodeKind::Task, Position::default());
        std::fs::write(&path, workflow.to_json_pretty().unwrap()).unwrap();

        let result = validate_workflow(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
