//! UMI-aware duplicate key construction
//!
//! This module turns a parsed alignment into the identity key used for
//! duplicate detection: UMI, strand, soft-clip-corrected 5' position and
//! reference name.

use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::cigar::op::Kind;
use thiserror::Error;

use crate::record::{AlignmentRecord, Strand};

/// Longest CIGAR operation representable in BAM (28-bit length field)
pub const MAX_OP_LEN: usize = (1 << 28) - 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CigarError {
    #[error("operation {0:?} has no length")]
    MissingLength(char),
    #[error("invalid operation {0:?}")]
    InvalidKind(char),
    #[error("operation length exceeds {MAX_OP_LEN}")]
    LengthOverflow,
    #[error("trailing length without an operation")]
    TrailingLength,
}

/// Identity of a molecule: two records are duplicates iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey {
    pub umi: String,
    pub strand: Strand,
    pub position: i64,
    pub reference: String,
}

impl NormalizedKey {
    #[inline]
    pub fn new(umi: &str, strand: Strand, position: i64, reference: &str) -> Self {
        Self {
            umi: umi.to_string(),
            strand,
            position,
            reference: reference.to_string(),
        }
    }

    /// Build the key for a record that already passed the UMI gate.
    pub fn from_record(record: &AlignmentRecord) -> Self {
        let strand = record.strand();
        let position = normalized_position(record.position(), record.cigar(), strand);
        Self::new(record.umi(), strand, position, record.reference())
    }
}

fn op_kind(c: char) -> Option<Kind> {
    let kind = match c {
        'M' => Kind::Match,
        'I' => Kind::Insertion,
        'D' => Kind::Deletion,
        'N' => Kind::Skip,
        'S' => Kind::SoftClip,
        'H' => Kind::HardClip,
        'P' => Kind::Pad,
        '=' => Kind::SequenceMatch,
        'X' => Kind::SequenceMismatch,
        _ => return None,
    };
    Some(kind)
}

/// Tokenize a SAM CIGAR string. `*` and the empty string yield no operations.
pub fn parse_cigar(cigar: &str) -> Result<Vec<Op>, CigarError> {
    if cigar.is_empty() || cigar == "*" {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut len: Option<usize> = None;
    for c in cigar.chars() {
        if let Some(d) = c.to_digit(10) {
            let n = len.unwrap_or(0) * 10 + d as usize;
            if n > MAX_OP_LEN {
                return Err(CigarError::LengthOverflow);
            }
            len = Some(n);
        } else {
            let kind = op_kind(c).ok_or(CigarError::InvalidKind(c))?;
            let n = len.take().ok_or(CigarError::MissingLength(c))?;
            ops.push(Op::new(kind, n));
        }
    }
    if len.is_some() {
        return Err(CigarError::TrailingLength);
    }
    Ok(ops)
}

/// Length of the soft clip at one end of the alignment, looking through any
/// hard clip, which always sits outermost.
fn soft_clip_len<'a, I>(ops: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a Op>,
{
    for op in ops {
        match op.kind() {
            Kind::HardClip => continue,
            Kind::SoftClip => return i64::try_from(op.len()).ok(),
            _ => return Some(0),
        }
    }
    Some(0)
}

fn reference_span(ops: &[Op]) -> Option<i64> {
    ops.iter()
        .filter(|op| op.kind().consumes_reference())
        .try_fold(0i64, |span, op| span.checked_add(i64::try_from(op.len()).ok()?))
}

/// Compute the soft-clip-corrected 5' position of a read.
///
/// Forward reads move left by the leading soft clip. Reverse reads move right
/// by every reference-consuming operation plus the trailing soft clip.
/// Insertions never move the position. An unparseable CIGAR counts as no
/// reference consumption, so the raw position is returned; so does a shift
/// that would overflow.
pub fn normalized_position(position: i64, cigar: &str, strand: Strand) -> i64 {
    let ops = match parse_cigar(cigar) {
        Ok(ops) => ops,
        Err(e) => {
            log::debug!("unparseable CIGAR {cigar:?} ({e}), using raw position");
            return position;
        }
    };

    let shifted = match strand {
        Strand::Forward => soft_clip_len(&ops).and_then(|clip| position.checked_sub(clip)),
        Strand::Reverse => reference_span(&ops)
            .zip(soft_clip_len(ops.iter().rev()))
            .and_then(|(span, clip)| position.checked_add(span)?.checked_add(clip)),
    };
    shifted.unwrap_or_else(|| {
        log::debug!("5' shift of {cigar:?} from {position} overflows, using raw position");
        position
    })
}
