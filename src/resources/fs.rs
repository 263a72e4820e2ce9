//! File-system helpers shared by module procedures.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Move the file at `source` to `dest`, replacing any file already there.
///
/// Parent directories of `dest` are created. Prefers an atomic rename and
/// falls back to copy + remove when the rename crosses a filesystem
/// boundary.
///
/// # Errors
///
/// Returns an error if the parent cannot be created or the file cannot be
/// moved.
pub fn move_file(source: &Path, dest: &Path) -> Result<()> {
    ensure_parent_dir(dest)?;
    if std::fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    std::fs::copy(source, dest)
        .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
    if let Err(e) = std::fs::remove_file(source) {
        let _ = std::fs::remove_file(dest);
        return Err(e).with_context(|| format!("remove {}", source.display()));
    }
    Ok(())
}

/// Returns `true` if nothing, not even a dangling symlink, exists at `path`.
#[must_use]
pub fn is_vacant(path: &Path) -> bool {
    path.symlink_metadata().is_err()
}
