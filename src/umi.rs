//! UMI filtering
//!
//! Records whose UMI cannot be trusted are dropped before they reach the
//! retention store. With an allowlist only listed UMIs pass; without one any
//! UMI containing an ambiguous base (`N`) is rejected.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DedupError, Result};

/// Base call marking an unknown nucleotide
pub const AMBIGUOUS_BASE: char = 'N';

#[derive(Debug, Clone)]
pub enum UmiGate {
    Known(HashSet<String>),
    Unconstrained,
}

impl UmiGate {
    /// Load an allowlist with one UMI per line. Blank lines are ignored.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DedupError::io(path, e))?;
        let gate = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            DedupError::Stream { source, .. } => DedupError::io(path, source),
            other => other,
        })?;
        if let UmiGate::Known(umis) = &gate {
            log::info!("loaded {} known UMIs from {}", umis.len(), path.display());
        }
        Ok(gate)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut umis = HashSet::new();
        for line in reader.lines() {
            let line = line.map_err(|e| DedupError::stream("reading UMI allowlist", e))?;
            let umi = line.trim();
            if !umi.is_empty() {
                umis.insert(umi.to_string());
            }
        }
        if umis.is_empty() {
            return Err(DedupError::Config("UMI allowlist is empty".to_string()));
        }
        Ok(UmiGate::Known(umis))
    }

    #[inline]
    pub fn accepts(&self, umi: &str) -> bool {
        match self {
            UmiGate::Known(umis) => umis.contains(umi),
            UmiGate::Unconstrained => !umi.contains(AMBIGUOUS_BASE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_known_umis() {
        let list = "AACCGGTT\n  GGTTAACC \n\nTTTTAAAA\n";
        let gate = UmiGate::from_reader(Cursor::new(list)).unwrap();
        assert!(gate.accepts("AACCGGTT"));
        assert!(gate.accepts("GGTTAACC"));
        assert!(!gate.accepts("ACGTACGT"));
        assert!(!gate.accepts(""));
    }

    #[test]
    fn test_known_mode_does_not_filter_n() {
        let gate = UmiGate::from_reader(Cursor::new("AANNGGTT\n")).unwrap();
        assert!(gate.accepts("AANNGGTT"));
    }

    #[test]
    fn test_unconstrained_rejects_ambiguous() {
        let gate = UmiGate::Unconstrained;
        assert!(gate.accepts("AACCGGTT"));
        assert!(!gate.accepts("AACNGGTT"));
    }

    #[test]
    fn test_empty_allowlist_is_config_error() {
        let err = UmiGate::from_reader(Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(err, DedupError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AACCGGTT").unwrap();
        writeln!(file, "CCGGTTAA").unwrap();
        let gate = UmiGate::from_path(file.path()).unwrap();
        assert!(gate.accepts("CCGGTTAA"));
    }

    #[test]
    fn test_missing_allowlist_is_io_error() {
        let err = UmiGate::from_path(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, DedupError::Io { .. }));
    }
}
