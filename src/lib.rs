//! umidedup - UMI-aware duplicate removal for coordinate-sorted SAM files
//!
//! A read is a duplicate of an earlier one when both share the UMI appended
//! to the read name, the strand, the reference sequence and the
//! soft-clip-corrected 5' position. One representative per molecule is kept:
//! the first one seen, or the one with the best mean base quality.
//!
//! # Example
//!
//! ```ignore
//! use umidedup::{Args, Config, run_dedup};
//!
//! let args = Args::parse();
//! let config = Config::from_args(&args)?;
//! let stats = run_dedup(&config)?;
//! ```

pub mod algorithm;
pub mod args;
pub mod config;
pub mod driver;
pub mod error;
pub mod io;
pub mod record;
pub mod stats;
pub mod store;
pub mod umi;

use std::fs::File;
use std::io::BufWriter;

// Re-export commonly used items
pub use algorithm::{NormalizedKey, normalized_position, parse_cigar};
pub use args::Args;
pub use config::{Config, UmiSource};
pub use driver::StreamDriver;
pub use error::{DedupError, MalformedRecord, Result};
pub use record::{AlignmentRecord, Strand};
pub use stats::DedupStats;
pub use store::{Decision, RetentionStore};
pub use umi::UmiGate;

/// Deduplicate `config.input` into `config.output`.
pub fn run_dedup(config: &Config) -> Result<DedupStats> {
    config.validate()?;

    if config.paired {
        log::warn!("--paired given: mates are not examined, reads are deduplicated individually");
    }

    let gate = match &config.umi_source {
        UmiSource::Allowlist(path) => UmiGate::from_path(path)?,
        UmiSource::Unconstrained => {
            log::info!("no UMI allowlist, dropping UMIs that contain N");
            UmiGate::Unconstrained
        }
    };

    let run_id = config.run_id.then(io::new_run_id);
    let name = |path: &std::path::Path| match run_id {
        Some(id) => io::tag_with_run_id(path, id),
        None => path.to_path_buf(),
    };

    let reader = io::open_input(&config.input)?;
    let output_path = name(&config.output);
    let output = io::create_output(&output_path)?;
    let duplicates: Option<BufWriter<File>> = match config.duplicate_sink() {
        Some(path) => {
            let path = name(path);
            log::info!("writing duplicates to {}", path.display());
            Some(io::create_output(&path)?)
        }
        None => None,
    };

    log::info!(
        "deduplicating {} into {}",
        config.input.display(),
        output_path.display()
    );
    StreamDriver::new(config, gate, output, duplicates).run(reader)
}
