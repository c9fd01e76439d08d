//! Batch discovery from a glob pattern

use glob::MatchOptions;
use memc_common::{MemcError, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Expand `pattern` into batch files, in the order the matcher yields them.
///
/// File names starting with `.` are never matched, so batches already marked
/// as processed are left alone. An invalid pattern is an error; individual
/// unreadable matches are logged and skipped.
pub fn discover_batches(pattern: &str) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    };
    let paths = glob::glob_with(pattern, options)
        .map_err(|e| MemcError::Pattern(format!("{pattern}: {e}")))?;

    let mut batches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => batches.push(path),
            Ok(path) => debug!(path = %path.display(), "Skipping non-file match"),
            Err(e) => warn!(error = %e, "Skipping unreadable match"),
        }
    }
    Ok(batches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_marked_batches() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.tsv.gz", "a.tsv.gz", ".c.tsv.gz", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.tsv.gz")).unwrap();

        let pattern = format!("{}/*.tsv.gz", dir.path().display());
        let batches = discover_batches(&pattern).unwrap();
        let names: Vec<_> = batches
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tsv.gz", "b.tsv.gz"]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(discover_batches("data/[*.tsv.gz"), Err(MemcError::Pattern(_))));
    }

    #[test]
    fn test_no_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.tsv.gz", dir.path().display());
        assert!(discover_batches(&pattern).unwrap().is_empty());
    }
}
