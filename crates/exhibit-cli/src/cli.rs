//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exhibit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Refuse inputs larger than this (suffixes K, M, G, T; default 512M)
    #[arg(long, global = true, value_parser = parse_byte_size)]
    pub max_input_size: Option<u64>,

    /// Use stricter bomb thresholds and a 64M input cap
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score archives and images without extracting them
    Scan(ScanArgs),
    /// Show embedded image metadata and forensic flags
    Metadata(MetadataArgs),
    /// Run pixel-level tamper heuristics on an image
    Tamper(TamperArgs),
    /// Package a report, custody log and artifacts into an evidence ZIP
    Export(ExportArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Files to analyse
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Compression ratio that marks an archive entry as a bomb
    #[arg(long, value_parser = parse_ratio)]
    pub max_compression_ratio: Option<f64>,
}

#[derive(clap::Args)]
pub struct MetadataArgs {
    /// Image to read
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Print every raw tag, not just the structured fields
    #[arg(short, long)]
    pub all: bool,
}

#[derive(clap::Args)]
pub struct TamperArgs {
    /// Image to analyse
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Grid cells per axis for hotspot detection
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=256))]
    pub grid_cells: Option<u32>,

    /// Maximum number of hotspots to report
    #[arg(long)]
    pub max_hotspots: Option<usize>,
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Source file the evidence is about
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Evidence ZIP to write
    #[arg(short, long, value_name = "ZIP")]
    pub output: PathBuf,

    /// Extra working file to include (can be repeated)
    #[arg(long = "artifact", short = 'a', value_name = "FILE")]
    pub artifacts: Vec<PathBuf>,

    /// Existing chain-of-custody log to continue
    #[arg(long, value_name = "FILE")]
    pub custody_log: Option<PathBuf>,

    /// Copy the source itself into the bundle
    #[arg(long)]
    pub include_source: bool,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid ratio: {s}"))?;
    if ratio.is_finite() && ratio >= 1.0 {
        Ok(ratio)
    } else {
        Err(format!("ratio must be at least 1: {s}"))
    }
}
