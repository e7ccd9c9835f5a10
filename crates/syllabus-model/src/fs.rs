use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::Builder;

/// Replaces `path` with `contents` through a sibling temp file and a rename,
/// so a crash never leaves a half-written draft or export behind. Missing
/// parent directories are created and an existing file keeps its mode.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut staged = Builder::new().prefix(".syllabus").tempfile_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.as_file().sync_all()?;

    if let Ok(existing) = fs::metadata(path) {
        let _ = fs::set_permissions(staged.path(), existing.permissions());
    }

    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}
