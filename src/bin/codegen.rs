//! Validation Module Generation CLI
//!
//! Generates one runtime-validation module per property path, runs every
//! module through blueprint validation, and writes the accepted modules to
//! the output directory. Any blueprint error fails the run, so a CI caller
//! can gate merges on this binary's exit code.
//!
//! Usage:
//!   schema-codegen --schema schemas/vision/app.schema.json --out generated
//!   schema-codegen --schema app.schema.json --path tables.name --dry-run

use std::fs;
use std::path::PathBuf;

use canvas_schemas::blueprint::BlueprintValidator;
use canvas_schemas::codegen::generate_module;
use canvas_schemas::config::PipelineConfig;
use canvas_schemas::resolver::Resolver;
use canvas_schemas::schema::SchemaNode;
use canvas_schemas::specs::extract;
use canvas_schemas::traverse::Traversal;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-codegen")]
#[command(about = "Generate runtime-validation modules from the vision schema")]
struct Cli {
    /// Root schema file
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Property paths to generate; defaults to every root property
    #[arg(short, long)]
    path: Vec<String>,

    /// Output directory for generated modules
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Config file overriding the default lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also emit behavioral scenarios next to each module
    #[arg(long)]
    with_specs: bool,

    /// Validate without writing files
    #[arg(long)]
    dry_run: bool,
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
    let schema_path = cli
        .schema
        .unwrap_or_else(|| config.schemas.vision_dir.join(&config.schemas.root_file));
    let out_dir = cli.out.unwrap_or(config.codegen.output_dir.clone());

    let resolved = Resolver::new().resolve_file(&schema_path)?;
    let root = SchemaNode::from_value(&resolved);
    let traversal = Traversal::new(&root);

    let paths: Vec<String> = if cli.path.is_empty() {
        root.properties()
            .map(|props| props.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    } else {
        cli.path.clone()
    };

    if !cli.dry_run {
        fs::create_dir_all(&out_dir)?;
    }

    let validator = BlueprintValidator::new();
    let mut error_count = 0usize;
    let mut warning_count = 0usize;

    for path in &paths {
        let Some(node) = traversal.locate(path) else {
            eprintln!("❌ {path}: path not found in schema");
            error_count += 1;
            continue;
        };

        let module = generate_module(path, node, &root.definitions);
        let report = validator.validate(&module, node);

        for issue in &report.errors {
            eprintln!("❌ {path}: {}", issue.message);
        }
        for issue in &report.warnings {
            eprintln!("⚠️  {path}: {}", issue.message);
        }
        error_count += report.errors.len();
        warning_count += report.warnings.len();

        if !report.valid {
            continue;
        }

        if !cli.dry_run {
            fs::write(out_dir.join(&module.file_name), &module.source_text)?;
        }

        if cli.with_specs {
            let mut scenarios = extract(&root, path);
            scenarios.scenarios.extend(canvas_schemas::specs::synthesize(
                path,
                node,
                &config.planner.critical_properties,
            ));
            if !cli.dry_run {
                let spec_file = module.file_name.replace(".ts", ".specs.json");
                fs::write(
                    out_dir.join(spec_file),
                    serde_json::to_string_pretty(&scenarios)?,
                )?;
            }
        }

        println!("✅ {path} -> {}", module.file_name);
    }

    eprintln!(
        "\n📦 {} module(s), {} error(s), {} warning(s)",
        paths.len(),
        error_count,
        warning_count
    );

    if error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
