//! Single-pass deduplication of a SAM text stream
//!
//! Header lines go straight to the primary output. Alignment lines are parsed,
//! filtered on their UMI, keyed and offered to the retention store. Rejected
//! records, and representatives displaced by a better copy, go to the optional
//! duplicate output.

use std::io::{BufRead, Write};

use bstr::io::BufReadExt;

use crate::algorithm::NormalizedKey;
use crate::config::Config;
use crate::error::{DedupError, Result};
use crate::io::{is_header, write_line};
use crate::record::AlignmentRecord;
use crate::stats::DedupStats;
use crate::store::{Decision, RetentionStore};
use crate::umi::UmiGate;

pub struct StreamDriver<W: Write, D: Write> {
    gate: UmiGate,
    store: RetentionStore,
    quality_aware: bool,
    output: W,
    duplicates: Option<D>,
    stats: DedupStats,
}

impl<W: Write, D: Write> StreamDriver<W, D> {
    pub fn new(config: &Config, gate: UmiGate, output: W, duplicates: Option<D>) -> Self {
        Self {
            gate,
            store: RetentionStore::new(config.quality_aware, config.window),
            quality_aware: config.quality_aware,
            output,
            duplicates,
            stats: DedupStats::default(),
        }
    }

    /// Consume the whole input, flush everything and return the run statistics.
    pub fn run<R: BufRead>(mut self, reader: R) -> Result<DedupStats> {
        for (index, line) in reader.byte_lines().enumerate() {
            let line = line.map_err(|e| DedupError::stream("reading input", e))?;
            if line.is_empty() {
                continue;
            }
            if is_header(&line) {
                write_line(&mut self.output, &line)?;
                self.stats.header_lines += 1;
            } else {
                self.process_alignment(index + 1, &line)?;
            }
        }
        self.finish()
    }

    fn process_alignment(&mut self, line_no: usize, line: &[u8]) -> Result<()> {
        self.stats.alignment_lines += 1;

        let record = match AlignmentRecord::parse(line) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("line {line_no}: skipping malformed record: {e}");
                self.stats.malformed += 1;
                return Ok(());
            }
        };

        if !self.gate.accepts(record.umi()) {
            self.stats.umi_rejected += 1;
            return Ok(());
        }

        let key = NormalizedKey::from_record(&record);
        let score = if self.quality_aware {
            record.mean_quality()
        } else {
            0.0
        };

        match self.store.observe(key, record, score, &mut self.output)? {
            Decision::Kept => self.stats.kept += 1,
            Decision::Replaced(previous) => {
                self.stats.replaced += 1;
                self.stats.duplicates += 1;
                self.capture_duplicate(&previous)?;
            }
            Decision::Rejected(record) => {
                self.stats.duplicates += 1;
                self.capture_duplicate(&record)?;
            }
        }
        Ok(())
    }

    fn capture_duplicate(&mut self, record: &AlignmentRecord) -> Result<()> {
        if let Some(duplicates) = self.duplicates.as_mut() {
            write_line(duplicates, record.line().as_bytes())?;
            self.stats.duplicates_written += 1;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<DedupStats> {
        self.store.finish(&mut self.output)?;
        self.output
            .flush()
            .map_err(|e| DedupError::stream("flushing output", e))?;
        if let Some(duplicates) = self.duplicates.as_mut() {
            duplicates
                .flush()
                .map_err(|e| DedupError::stream("flushing duplicate output", e))?;
        }
        self.stats.records_written = self.store.written();
        Ok(self.stats)
    }
}
