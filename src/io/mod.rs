//! SAM text I/O utilities
//!
//! This module opens the input and output files, names outputs (optionally
//! tagged with a random run identifier) and writes single lines to a sink.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DedupError, Result};

/// Marker that starts every SAM header line
pub const HEADER_PREFIX: u8 = b'@';

/// Upper bound (inclusive) of generated run identifiers
pub const MAX_RUN_ID: u32 = 100_000;

/// Write one SAM line followed by a newline.
#[inline]
pub fn write_line<W: Write + ?Sized>(out: &mut W, line: &[u8]) -> Result<()> {
    out.write_all(line)
        .and_then(|_| out.write_all(b"\n"))
        .map_err(|e| DedupError::stream("writing output", e))
}

#[inline]
pub fn is_header(line: &[u8]) -> bool {
    line.first() == Some(&HEADER_PREFIX)
}

/// Open the SAM input for buffered line reading
pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| DedupError::io(path, e))?;
    Ok(BufReader::with_capacity(1 << 18, file))
}

/// Create an output file, making its parent directory if needed
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DedupError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| DedupError::io(path, e))?;
    Ok(BufWriter::with_capacity(1 << 20, file))
}

pub fn new_run_id() -> u32 {
    fastrand::u32(1..=MAX_RUN_ID)
}

/// Insert `_<run_id>` between a file's stem and its extension.
///
/// `out/sample.sam` becomes `out/sample_4821.sam`; a name without an extension
/// just gets the suffix.
pub fn tag_with_run_id(path: &Path, run_id: u32) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(format!("_{run_id}"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_line() {
        let mut out = Vec::new();
        write_line(&mut out, b"@HD\tVN:1.6").unwrap();
        write_line(&mut out, b"r1\t0").unwrap();
        assert_eq!(out, b"@HD\tVN:1.6\nr1\t0\n");
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(b"@SQ\tSN:chr1\tLN:100"));
        assert!(!is_header(b"read@1\t0\tchr1"));
        assert!(!is_header(b""));
    }

    #[test]
    fn test_tag_with_run_id() {
        assert_eq!(
            tag_with_run_id(Path::new("out/sample.sam"), 4821),
            PathBuf::from("out/sample_4821.sam")
        );
        assert_eq!(
            tag_with_run_id(Path::new("dups"), 7),
            PathBuf::from("dups_7")
        );
    }

    #[test]
    fn test_run_id_range() {
        for _ in 0..100 {
            let id = new_run_id();
            assert!((1..=MAX_RUN_ID).contains(&id));
        }
    }

    #[test]
    fn test_create_output_makes_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.sam");
        let mut writer = create_output(&path).unwrap();
        write_line(&mut writer, b"@HD\tVN:1.6").unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert_eq!(fs::read_to_string(&path).unwrap(), "@HD\tVN:1.6\n");
    }

    #[test]
    fn test_open_missing_input() {
        let err = open_input(Path::new("/no/such/input.sam")).unwrap_err();
        assert!(matches!(err, DedupError::Io { .. }));
    }
}
