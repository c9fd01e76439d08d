//! Batch input: gzip-compressed, newline-delimited records

use flate2::read::MultiGzDecoder;
use memc_common::{MemcError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Read every trimmed, non-empty line of a gzipped batch file.
///
/// Concatenated gzip members are read as one stream. Decompression runs on
/// the blocking pool. Open and decompression errors
/// (including a truncated stream) fail the whole batch.
pub async fn read_batch_lines(path: &Path) -> Result<Vec<String>> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = File::open(&path)?;
        read_lines(MultiGzDecoder::new(file))
    })
    .await
    .map_err(|e| MemcError::Io(std::io::Error::other(e)))?
}

/// Collect trimmed, non-empty lines. Invalid UTF-8 is replaced, not fatal.
pub fn read_lines<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}
