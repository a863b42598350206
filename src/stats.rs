//! Run statistics

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupStats {
    pub header_lines: u64,
    pub alignment_lines: u64,
    pub malformed: u64,
    pub umi_rejected: u64,
    pub kept: u64,
    pub replaced: u64,
    pub duplicates: u64,
    /// Duplicates written to the duplicate output
    pub duplicates_written: u64,
    /// Alignment records written to the primary output
    pub records_written: u64,
}

impl DedupStats {
    /// Records that passed the UMI gate
    pub fn gated(&self) -> u64 {
        self.alignment_lines - self.malformed - self.umi_rejected
    }

    pub fn log_summary(&self, elapsed: Duration) {
        log::info!(
            "processed {} alignment records and {} header lines",
            self.alignment_lines,
            self.header_lines
        );
        if self.malformed > 0 {
            log::warn!("  skipped {} malformed records", self.malformed);
        }
        log::info!("  dropped {} records with unusable UMIs", self.umi_rejected);
        log::info!("  kept {} distinct molecules", self.kept);
        log::info!(
            "  found {} duplicates ({} replaced by a higher quality copy)",
            self.duplicates,
            self.replaced
        );
        log::info!("  wrote {} records", self.records_written);
        if self.duplicates_written > 0 {
            log::info!("  wrote {} duplicates", self.duplicates_written);
        }
        let secs = elapsed.as_secs();
        if secs >= 60 {
            log::info!("done in {} min {} sec", secs / 60, secs % 60);
        } else {
            log::info!("done in {:.1} sec", elapsed.as_secs_f64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated() {
        let stats = DedupStats {
            alignment_lines: 10,
            malformed: 1,
            umi_rejected: 2,
            ..Default::default()
        };
        assert_eq!(stats.gated(), 7);
    }
}
