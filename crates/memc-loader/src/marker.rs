//! Completion marker: a processed batch is renamed to `.<name>`

use memc_common::{MemcError, Result};
use std::io;
use std::path::{Path, PathBuf};

/// Rename `path` to its dot-prefixed sibling and return the new path.
///
/// Already dot-prefixed paths are returned unchanged. The rename stays in
/// the same directory, so it is atomic on a single filesystem.
pub fn dot_rename(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            MemcError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("batch path has no file name: {}", path.display()),
            ))
        })?;

    if name.starts_with('.') {
        return Ok(path.to_path_buf());
    }

    let target = path.with_file_name(format!(".{name}"));
    std::fs::rename(path, &target)?;
    Ok(target)
}
