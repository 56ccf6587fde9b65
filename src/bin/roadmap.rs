//! Release Roadmap CLI
//!
//! Runs the differ over the vision and current trees, buckets the result
//! into ordered release phases, and prints the phase list for the roadmap
//! document renderer.
//!
//! Usage:
//!   schema-roadmap --vision schemas/vision --current schemas/current
//!   schema-roadmap --format json

use std::path::PathBuf;

use canvas_schemas::config::PipelineConfig;
use canvas_schemas::diff::diff_trees;
use canvas_schemas::phases::plan;
use canvas_schemas::resolver::Resolver;
use canvas_schemas::schema::SchemaNode;
use clap::Parser;
use semver::Version;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-roadmap")]
#[command(about = "Bucket schema completion status into ordered release phases")]
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

    let vision_json = Resolver::new().resolve_file(&vision_dir.join(root_file))?;
    let vision = SchemaNode::from_value(&vision_json);
    let current = Resolver::new()
        .resolve_file(&current_dir.join(root_file))
        .ok()
        .map(|v| SchemaNode::from_value(&v));

    let statuses = diff_trees(current.as_ref(), &vision);
    let package_version = Version::parse(&config.planner.package_version)?;
    let phases = plan(&statuses, &vision, &package_version);

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&phases)?),
        _ => {
            println!("🗺️  Release Roadmap\n");
            for phase in &phases {
                println!(
                    "Phase {} — {} ({}, {}% complete, {})",
                    phase.number,
                    phase.name,
                    phase.version,
                    phase.completion_percent,
                    phase.duration_estimate
                );
                for property in &phase.properties {
                    println!("   - {} ({:?})", property.path, property.status);
                }
                if !phase.dependencies.is_empty() {
                    println!("   depends on: {}", phase.dependencies.join(", "));
                }
                println!();
            }
        }
    }

    Ok(())
}
