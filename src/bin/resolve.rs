//! Schema Resolution CLI
//!
//! Resolves every cross-file `$ref` reachable from a root schema file and
//! prints the inlined tree. Remaining `$ref` markers indicate incomplete
//! subtrees; `--check` turns their presence into a failing exit code.
//!
//! Usage:
//!   schema-resolve schemas/vision/app.schema.json
//!   schema-resolve schemas/vision/app.schema.json --check

use std::path::PathBuf;

use canvas_schemas::resolver::{unresolved_refs, Resolver};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-resolve")]
#[command(about = "Resolve cross-file $ref pointers into one inlined schema tree")]
struct Cli {
    /// Root schema file
    schema: PathBuf,

    /// Output format (pretty, compact)
    #[arg(short, long, default_value = "pretty")]
    format: String,

    /// Exit non-zero when unresolved references remain
    #[arg(long)]
    check: bool,
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
    let mut resolver = Resolver::new();
    let resolved = resolver.resolve_file(&cli.schema)?;

    match cli.format.as_str() {
        "compact" => println!("{}", serde_json::to_string(&resolved)?),
        _ => println!("{}", serde_json::to_string_pretty(&resolved)?),
    }

    let leftover = unresolved_refs(&resolved);
    if leftover.is_empty() {
        eprintln!("✅ Resolved {} file(s), no unresolved references", resolver.cached_files());
    } else {
        eprintln!(
            "⚠️  {} unresolved reference(s) remain:",
            leftover.len()
        );
        for target in &leftover {
            eprintln!("   - {target}");
        }
        if cli.check {
            std::process::exit(1);
        }
    }

    Ok(())
}
