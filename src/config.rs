//! Run configuration
//!
//! A `Config` is built once from the command line, validated, and passed by
//! reference to the driver and the retention store.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::args::Args;
use crate::error::{DedupError, Result};

/// Value of `--umi` meaning "no allowlist, filter ambiguous UMIs instead"
pub const NO_ALLOWLIST_SENTINEL: &str = "random";

/// Default capacity of the sliding output window
pub const DEFAULT_WINDOW_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UmiSource {
    Allowlist(PathBuf),
    Unconstrained,
}

impl UmiSource {
    pub fn parse(value: &str) -> Self {
        if value == NO_ALLOWLIST_SENTINEL {
            UmiSource::Unconstrained
        } else {
            UmiSource::Allowlist(PathBuf::from(value))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub umi_source: UmiSource,
    /// Accepted for compatibility; mate-aware deduplication is not performed.
    pub paired: bool,
    /// Write rejected records to `duplicate_output`
    pub store_duplicates: bool,
    pub duplicate_output: Option<PathBuf>,
    /// Keep the duplicate with the highest mean base quality instead of the first
    pub quality_aware: bool,
    /// Capacity of the sliding output window; `None` holds a whole reference
    /// block in memory.
    pub window: Option<NonZeroUsize>,
    /// Tag output file names with a random run identifier
    pub run_id: bool,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let window = match args.window {
            Some(n) => Some(NonZeroUsize::new(n).ok_or_else(|| {
                DedupError::Config("--window capacity must be at least 1".to_string())
            })?),
            None => None,
        };

        let config = Self {
            input: args.file.clone(),
            output: args.output.clone(),
            umi_source: UmiSource::parse(&args.umi),
            paired: args.paired,
            store_duplicates: args.store_duplicates,
            duplicate_output: args.duplicate_output.clone(),
            quality_aware: args.quality,
            window,
            run_id: args.run_id,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent option combinations before any input is read.
    pub fn validate(&self) -> Result<()> {
        if self.store_duplicates && self.duplicate_output.is_none() {
            return Err(DedupError::Config(
                "duplicate capture requested but no duplicate output given (use --duplicate-output)"
                    .to_string(),
            ));
        }
        if self.window.is_some() && !self.quality_aware {
            return Err(DedupError::Config(
                "--window only applies to quality-aware mode (use --quality)".to_string(),
            ));
        }
        Ok(())
    }

    /// The duplicate sink path, present only when duplicate capture is on.
    pub fn duplicate_sink(&self) -> Option<&PathBuf> {
        if self.store_duplicates {
            self.duplicate_output.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            file: PathBuf::from("in.sam"),
            paired: false,
            umi: NO_ALLOWLIST_SENTINEL.to_string(),
            output: PathBuf::from("out.sam"),
            store_duplicates: false,
            duplicate_output: None,
            quality: false,
            window: None,
            run_id: false,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(&base_args()).unwrap();
        assert_eq!(config.umi_source, UmiSource::Unconstrained);
        assert!(config.duplicate_sink().is_none());
        assert!(config.window.is_none());
    }

    #[test]
    fn test_allowlist_source() {
        let mut args = base_args();
        args.umi = "umis.txt".to_string();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.umi_source, UmiSource::Allowlist(PathBuf::from("umis.txt")));
    }

    #[test]
    fn test_store_duplicates_requires_output() {
        let mut args = base_args();
        args.store_duplicates = true;
        assert!(matches!(Config::from_args(&args), Err(DedupError::Config(_))));

        args.duplicate_output = Some(PathBuf::from("dups.sam"));
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.duplicate_sink(), Some(&PathBuf::from("dups.sam")));
    }

    #[test]
    fn test_duplicate_output_without_flag_is_unused() {
        let mut args = base_args();
        args.duplicate_output = Some(PathBuf::from("dups.sam"));
        let config = Config::from_args(&args).unwrap();
        assert!(config.duplicate_sink().is_none());
    }

    #[test]
    fn test_window_validation() {
        let mut args = base_args();
        args.window = Some(DEFAULT_WINDOW_CAPACITY);
        assert!(matches!(Config::from_args(&args), Err(DedupError::Config(_))));

        args.quality = true;
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.window.map(NonZeroUsize::get), Some(10));

        args.window = Some(0);
        assert!(matches!(Config::from_args(&args), Err(DedupError::Config(_))));
    }
}
