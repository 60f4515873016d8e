use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reflow::discovery::{self, DiscoveryConfig};
use reflow::line_joiner::{CleanOptions, LineReflower, SourceKind};
use reflow::parallel_processing::{process_files_parallel, write_stats, ProcessingConfig};
use reflow::restart_log::RestartLog;

/// Environment switch for line joining; `0`, `false` or `off` disable it
const LINE_JOINING_ENV: &str = "REFLOW_LINE_JOINING";

#[derive(Parser, Debug)]
#[command(name = "reflow")]
#[command(about = "Rebuild paragraphs from hard-wrapped and PDF-extracted text files")]
#[command(version)]
struct Args {
    /// Root directory to scan for input files
    root_dir: PathBuf,

    /// Extension of input files
    #[arg(long, default_value = "txt")]
    extension: String,

    /// Source kind of the inputs: auto, pdf or txt
    #[arg(long)]
    source: Option<SourceKind>,

    /// JSON file with cleaning options (camelCase keys)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Keep every physical line; never merge
    #[arg(long)]
    no_line_joining: bool,

    /// Plain text: keep single line breaks
    #[arg(long)]
    preserve_single_line_breaks: bool,

    /// Separate paragraphs with a single newline instead of a blank line
    #[arg(long)]
    no_paragraph_breaks: bool,

    /// Reprocess files even when their output is complete
    #[arg(long)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Walk the tree with the parallel walker
    #[arg(long)]
    parallel_discovery: bool,

    /// Maximum files processed at once (defaults to the CPU count)
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

fn line_joining_from_env() -> Option<bool> {
    let value = std::env::var(LINE_JOINING_ENV).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "off" | "no" => Some(false),
        "1" | "true" | "on" | "yes" => Some(true),
        other => {
            warn!("Ignoring unrecognised {}={}", LINE_JOINING_ENV, other);
            None
        }
    }
}

async fn load_options(path: Option<&Path>) -> Result<CleanOptions> {
    let Some(path) = path else {
        return Ok(CleanOptions::default());
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid options file {}", path.display()))
}

/// Defaults, then the options file, then command-line flags
async fn resolve_options(args: &Args) -> Result<CleanOptions> {
    let mut options = load_options(args.options.as_deref()).await?;

    if let Some(source) = args.source {
        options.source = source;
    }
    if args.preserve_single_line_breaks {
        options.preserve_single_line_breaks = Some(true);
    }
    if args.no_paragraph_breaks {
        options.preserve_paragraph_breaks = false;
    }
    if let Some(enabled) = line_joining_from_env() {
        options.joiner.line_joining_enabled = enabled;
    }
    if args.no_line_joining {
        options.joiner.line_joining_enabled = false;
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting reflow");
    info!(?args, "Parsed CLI arguments");

    if !args.root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.root_dir.display());
    }
    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let options = resolve_options(&args).await?;
    info!(?options, "Resolved cleaning options");

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        extension: args.extension.clone(),
    };

    info!("Starting file discovery in: {}", args.root_dir.display());
    let discovered = if args.parallel_discovery {
        discovery::collect_discovered_files_parallel(&args.root_dir, discovery_config).await?
    } else {
        discovery::collect_discovered_files(&args.root_dir, discovery_config).await?
    };

    let mut files = Vec::with_capacity(discovered.len());
    for file in discovered {
        match file.error {
            None => files.push(file.path),
            Some(error) => info!("Issue with {}: {}", file.path.display(), error),
        }
    }
    files.sort();

    let mut restart_log = RestartLog::load(&args.root_dir).await;
    let dropped = restart_log.verify_completed_files().await?;
    if !dropped.is_empty() {
        info!("Dropped {} stale restart log entries", dropped.len());
    }
    info!(completed = restart_log.completed_count(), "Restart log loaded");

    let config = ProcessingConfig {
        overwrite_all: args.overwrite_all,
        fail_fast: args.fail_fast,
        max_concurrent: args.max_concurrent.unwrap_or_else(num_cpus::get),
        use_mmap: args.use_mmap,
        show_progress: !args.no_progress,
    };

    let reflower = Arc::new(LineReflower::new()?);
    let stats = process_files_parallel(&files, reflower, Arc::new(options), &config, &mut restart_log).await?;

    restart_log.save(&args.root_dir).await?;
    write_stats(&stats, &args.stats_out).await?;

    println!("reflow v{} - processing complete", env!("CARGO_PKG_VERSION"));
    println!(
        "Processed: {}, skipped: {}, failed: {}",
        stats.files_processed, stats.files_skipped, stats.files_failed
    );
    println!("Stats written to {}", args.stats_out.display());

    if args.fail_fast && stats.files_failed > 0 {
        anyhow::bail!("Aborted after {} failed file(s)", stats.files_failed);
    }

    Ok(())
}
