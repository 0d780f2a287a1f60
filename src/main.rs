//! depwalk CLI - inspect and dry-run dependency-ordered walks

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use depwalk::error::{FixSuggestion, GraphError, WalkError};

/// Errors surfaced by the CLI; the dry-run visitor itself never fails
type CliError = WalkError<Infallible>;
use depwalk::{build_validated, collect, visit_fn, DepwalkConfig, EventLog, Project};

/// Unit payloads are kept as raw JSON maps: the CLI never interprets them
type Payload = Map<String, Value>;

#[derive(Parser)]
#[command(name = "depwalk")]
#[command(about = "Dependency-ordered traversal of unit graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and check it for cycles
    Check {
        /// Path to the project file
        file: PathBuf,
    },

    /// Dry-run a walk, printing units in visit order
    Plan {
        /// Path to the project file
        file: PathBuf,

        /// Tear-down order (dependents first)
        #[arg(short, long)]
        reverse: bool,

        /// Only visit these units and everything downstream of them
        #[arg(short, long, value_delimiter = ',')]
        from: Vec<String>,

        /// Maximum concurrent visits (0 = unbounded)
        #[arg(short = 'j', long)]
        max_concurrency: Option<usize>,

        /// Print the event log as JSON after the walk
        #[arg(long)]
        events: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => check_project(&file).map_err(WalkError::Graph),
        Commands::Plan {
            file,
            reverse,
            from,
            max_concurrency,
            events,
        } => plan_project(&file, reverse, from, max_concurrency, events).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn check_project(file: &Path) -> Result<(), GraphError> {
    let project: Project<Payload> = Project::load(file)?;
    let disabled = project.disabled.len();
    let graph = build_validated(project)?;

    println!("{} Project '{}' is valid", "✓".green(), file.display());
    println!("  Units: {}", graph.len());
    println!("  Disabled: {}", disabled);
    println!("  Leaves: {}", graph.leaves().join(", "));
    println!("  Roots: {}", graph.roots().join(", "));
    println!("  Order: {}", graph.topological_order().join(" -> "));

    Ok(())
}

async fn plan_project(
    file: &Path,
    reverse: bool,
    from: Vec<String>,
    max_concurrency: Option<usize>,
    events: bool,
) -> Result<(), CliError> {
    let config = DepwalkConfig::load()?.with_env()?;
    let project: Project<Payload> = Project::load(file)?;
    let total = project.units.len();

    let mut options = config.walk_options().with_start_from(from);
    if reverse {
        options = options.reverse();
    }
    if let Some(max) = max_concurrency {
        options = options.with_max_concurrency(max);
    }
    let log = EventLog::new();
    options = options.with_emitter(Arc::new(log.clone()));

    println!(
        "{} Planning {} walk over {} units...\n",
        "→".cyan(),
        options.direction(),
        total
    );

    let position = Arc::new(AtomicUsize::new(0));
    let visitor = {
        let position = Arc::clone(&position);
        visit_fn(move |unit: String, _payload: Payload, _: CancellationToken| {
            let position = Arc::clone(&position);
            async move {
                let n = position.fetch_add(1, Ordering::SeqCst) + 1;
                println!("  {} {}", format!("[{n}/{total}]").green(), unit);
                Ok::<_, Infallible>(true)
            }
        })
    };

    let results = collect(project, visitor, options).await?;

    let skipped: Vec<String> = results
        .into_sorted()
        .into_iter()
        .filter_map(|(unit, visited)| (!visited).then_some(unit))
        .collect();
    if !skipped.is_empty() {
        println!("\n  {} {}", "Skipped:".dimmed(), skipped.join(", "));
    }

    if events {
        let json = serde_json::to_string_pretty(&log.to_json()).map_err(|e| GraphError::Config {
            reason: format!("Failed to render event log: {e}"),
        })?;
        println!("{json}");
    }

    Ok(())
}
