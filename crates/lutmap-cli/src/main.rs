//! lutmap - compile, inspect and query lookup tables
//!
//! Works on YAML/JSON map documents as read by `lutmap-config`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lutmap_core::ElementType;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lutmap")]
#[command(author, version, about = "Compile, inspect and query lookup tables")]
#[command(long_about = "
Builds lookup tables from map documents and shows what they do.

Examples:
  lutmap color red grey.5                # Resolve color codes (BGR, 8-bit)
  lutmap color sky_blue --rgb --normalized
  lutmap color --list                    # List base colors
  lutmap inspect labels.yaml --name classes
  lutmap lookup labels.yaml -k 0,0,255 -k red
  lutmap -v lookup ids.yaml -k 3 --dtype f32
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve color codes to channel values
    #[command(visible_alias = "c")]
    Color(ColorArgs),

    /// Build a map and show its lookup tables
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Map individual keys through a map
    #[command(visible_alias = "l")]
    Lookup(LookupArgs),
}

#[derive(Args)]
struct ColorArgs {
    /// Color codes (name or name.tint)
    #[arg(required_unless_present = "list")]
    codes: Vec<String>,

    /// Output normalized [0, 1] values instead of 8-bit
    #[arg(short, long)]
    normalized: bool,

    /// RGB channel order (default BGR)
    #[arg(long)]
    rgb: bool,

    /// List base color names
    #[arg(long)]
    list: bool,
}

#[derive(Args)]
struct MapSource {
    /// Map document (YAML or JSON); later files are merged over earlier ones
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Named map section under `maps`
    #[arg(short, long)]
    name: Option<String>,

    /// Append lists when merging documents (by item field if given)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    append: Option<String>,

    /// Source element type: u8, u16, u32, i16, i32, i64, f16, f32, f64
    #[arg(short, long, default_value = "u8")]
    dtype: ElementType,
}

#[derive(Args)]
struct InspectArgs {
    #[command(flatten)]
    source: MapSource,

    /// Print every destination row
    #[arg(short, long)]
    table: bool,
}

#[derive(Args)]
struct LookupArgs {
    #[command(flatten)]
    source: MapSource,

    /// Key to look up: comma-separated numbers or a color code (repeatable)
    #[arg(short, long = "key", required = true)]
    keys: Vec<String>,
}

fn init_logging(verbose: u8, log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = log else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .with_context(|| format!("Invalid log path: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Color(args) => commands::color::run(args, cli.verbose),
        Commands::Inspect(args) => commands::inspect::run(args, cli.verbose),
        Commands::Lookup(args) => commands::lookup::run(args, cli.verbose),
    }
}
