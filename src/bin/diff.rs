//! Schema Completion Diff CLI
//!
//! Compares the vision schema tree against the currently implemented tree
//! and reports per-path status, completion, and the aggregate summary.
//!
//! Usage:
//!   schema-diff --vision schemas/vision --current schemas/current
//!   schema-diff --config pipeline.toml --format json

use std::path::PathBuf;

use canvas_schemas::config::PipelineConfig;
use canvas_schemas::diff::{diff_trees, summarize, Status};
use canvas_schemas::resolver::Resolver;
use canvas_schemas::schema::SchemaNode;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-diff")]
#[command(about = "Report completion of the implemented schema against the vision schema")]
struct Cli {
    /// Directory holding the vision schema files
    #[arg(long)]
    vision: Option<PathBuf>,

    /// Directory holding the implemented schema files
    #[arg(long)]
    current: Option<PathBuf>,

    /// Config file overriding the default lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Fail when any vision path is missing
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    let vision_dir = cli.vision.unwrap_or(config.schemas.vision_dir.clone());
    let current_dir = cli.current.unwrap_or(config.schemas.current_dir.clone());
    let root_file = &config.schemas.root_file;

    let vision = resolve_root(&vision_dir.join(root_file))?;
    let current = resolve_root(&current_dir.join(root_file)).ok();

    let statuses = diff_trees(current.as_ref(), &vision);
    let report = summarize(&statuses);

    match cli.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "report": report,
                "properties": statuses,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("🔍 Schema Completion Report\n");
            for status in &statuses {
                let marker = match status.status {
                    Status::Complete => "✅",
                    Status::Partial => "🟡",
                    Status::Missing => "❌",
                };
                println!(
                    "{marker} {:<50} {:>3}%  (complexity {})",
                    status.path, status.completion_percent, status.complexity
                );
                for feature in &status.missing_features {
                    println!("      missing: {feature}");
                }
            }
            println!(
                "\n📊 {}/{} implemented, {} missing, {}% complete",
                report.implemented_properties,
                report.total_properties,
                report.missing_properties,
                report.completion_percent
            );
        }
    }

    if cli.strict && report.missing_properties > 0 {
        eprintln!("\n⚠️  Missing properties detected (strict mode)");
        std::process::exit(1);
    }

    Ok(())
}

fn resolve_root(path: &std::path::Path) -> anyhow::Result<SchemaNode> {
    let resolved = Resolver::new().resolve_file(path)?;
    Ok(SchemaNode::from_value(&resolved))
}
