use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::exec::Executor;
use crate::logging::Log;

/// Name of the managed-links subtree inside the backup folder.
pub const STOW_DIR: &str = "STOW";
/// Name of the package manifest inside the backup folder.
pub const BREWFILE: &str = "Brewfile";

/// Shared context for module backup and restore.
pub struct Context {
    /// User's home directory; stow's target.
    pub home: PathBuf,
    /// Absolute backup folder root.
    pub backup_root: PathBuf,
    /// Logger for output.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Whether to preview changes without applying them.
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("home", &self.home)
            .field("backup_root", &self.backup_root)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        home: PathBuf,
        backup_root: PathBuf,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Self {
        Self {
            home,
            backup_root,
            log,
            executor,
            dry_run,
        }
    }

    /// `<backup>/STOW`, the stow directory.
    #[must_use]
    pub fn stow_dir(&self) -> PathBuf {
        self.backup_root.join(STOW_DIR)
    }

    /// `<backup>/Brewfile`.
    #[must_use]
    pub fn brewfile(&self) -> PathBuf {
        self.backup_root.join(BREWFILE)
    }

    /// Location of `dotfile` inside the stow package for `module`.
    #[must_use]
    pub fn managed_path(&self, module: &str, dotfile: &str) -> PathBuf {
        self.stow_dir().join(module).join(dotfile)
    }

    /// Location of `relative` under the home directory.
    #[must_use]
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    /// Get a reference to the executor.
    #[must_use]
    pub fn executor(&self) -> &dyn Executor {
        &*self.executor
    }

    /// Shorten `path` to `~/...` when it lives under the home directory.
    #[must_use]
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.home).map_or_else(
            |_| path.display().to_string(),
            |rest| format!("~/{}", rest.display()),
        )
    }
}

/// Home directory from `HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or empty.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))
}
