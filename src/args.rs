// Command-line argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "umidedup",
    about = "Remove UMI-aware PCR duplicates from a coordinate-sorted SAM file"
)]
pub struct Args {
    /// Coordinate-sorted SAM file
    #[arg(short, long)]
    pub file: PathBuf,
    /// Input is paired-end (accepted, mates are not examined)
    #[arg(short, long)]
    pub paired: bool,
    /// File of known UMIs, one per line, or `random` to only drop UMIs containing N
    #[arg(short, long, default_value = crate::config::NO_ALLOWLIST_SENTINEL)]
    pub umi: String,
    /// Deduplicated SAM output
    #[arg(short, long)]
    pub output: PathBuf,
    /// Also write removed duplicates to --duplicate-output
    #[arg(long, visible_alias = "ds")]
    pub store_duplicates: bool,
    #[arg(long, visible_alias = "do")]
    pub duplicate_output: Option<PathBuf>,
    /// Keep the duplicate with the highest mean base quality instead of the first seen
    #[arg(short, long)]
    pub quality: bool,
    /// Hold only the last N retained reads for quality replacement (default 10)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "10")]
    pub window: Option<usize>,
    /// Add a random run identifier to output file names
    #[arg(long)]
    pub run_id: bool,
}
