//! SAM text record parsing
//!
//! Only the columns needed for duplicate detection are decoded; the raw line
//! is kept as-is so retained records are written back byte-for-byte.

use bstr::ByteSlice;
use noodles::sam::alignment::record::Flags;

use crate::error::MalformedRecord;

/// Minimum number of mandatory SAM columns
pub const MIN_FIELDS: usize = 11;

/// Separator between the read name and the UMI appended to it
pub const UMI_SEPARATOR: char = ':';

/// Phred+33 offset of the quality string encoding
const PHRED_OFFSET: f64 = 33.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Orientation from the FLAG field (bit 0x10 set means reverse)
    #[inline]
    pub fn from_flags(flags: Flags) -> Self {
        if flags.is_reverse_complemented() {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }
}

/// A single alignment line plus the fields decoded from it
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    line: String,
    name: String,
    flags: Flags,
    reference: String,
    position: i64,
    cigar: String,
    quality: String,
}

impl AlignmentRecord {
    /// Parse one non-header line with its terminator already removed.
    pub fn parse(line: &[u8]) -> Result<Self, MalformedRecord> {
        let text = line.to_str().map_err(|_| MalformedRecord::InvalidUtf8)?;
        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(MalformedRecord::TooFewFields(fields.len()));
        }

        let flags = fields[1]
            .parse::<u16>()
            .map(Flags::from)
            .map_err(|_| MalformedRecord::InvalidFlag(fields[1].to_string()))?;
        // POS is a positive 32-bit value in SAM; anything else cannot be keyed
        let position = fields[3]
            .parse::<i32>()
            .ok()
            .filter(|&p| p > 0)
            .map(i64::from)
            .ok_or_else(|| MalformedRecord::InvalidPosition(fields[3].to_string()))?;

        Ok(Self {
            name: fields[0].to_string(),
            flags,
            reference: fields[2].to_string(),
            position,
            cigar: fields[5].to_string(),
            quality: fields[10].to_string(),
            line: text.to_string(),
        })
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// 1-based leftmost mapping position as written in the POS column
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn cigar(&self) -> &str {
        &self.cigar
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// The UMI is whatever follows the last `:` of the read name.
    pub fn umi(&self) -> &str {
        match self.name.rfind(UMI_SEPARATOR) {
            Some(i) => &self.name[i + UMI_SEPARATOR.len_utf8()..],
            None => &self.name,
        }
    }

    #[inline]
    pub fn strand(&self) -> Strand {
        Strand::from_flags(self.flags)
    }

    /// Mean Phred+33 base quality, used to pick the best copy of a duplicate
    #[inline]
    pub fn mean_quality(&self) -> f64 {
        mean_phred(&self.quality)
    }
}

/// Mean Phred+33 score of a quality string.
///
/// A missing quality (`*`) or an empty string scores 0 so any real quality
/// string beats it.
pub fn mean_phred(quality: &str) -> f64 {
    if quality.is_empty() || quality == "*" {
        return 0.0;
    }
    let total: f64 = quality.bytes().map(|b| f64::from(b) - PHRED_OFFSET).sum();
    total / quality.len() as f64
}
