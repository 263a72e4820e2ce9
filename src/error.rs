//! Domain-specific error types for the backup engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ModuleError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! - [`ConfigError`] is fatal: nothing runs without a valid configuration.
//! - [`ModuleError`] aborts one module; it is recorded in the report and the
//!   batch continues with the next module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while locating, reading, or parsing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration has no `BackupFolder:` line, or its value is empty.
    #[error("configuration does not set a BackupFolder")]
    MissingBackupFolder,

    /// An I/O error occurred while reading the configuration file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that abort a single module without stopping the batch.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// The configuration names a module the registry does not know.
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// A symlink at the target points somewhere other than the backup folder.
    #[error(
        "{} is a symlink to {}, expected {}; remove or repoint it manually",
        .target.display(),
        .actual.display(),
        .expected.display()
    )]
    ConflictingSymlink {
        /// Dotfile path in the home directory.
        target: PathBuf,
        /// Path inside the managed subtree the link should resolve to.
        expected: PathBuf,
        /// Path the existing link actually resolves to.
        actual: PathBuf,
    },

    /// A regular file occupies the path a restore would link.
    #[error(
        "{} is a regular file; move it aside to restore the backed up version",
        .target.display()
    )]
    UnresolvableConflict {
        /// Dotfile path in the home directory.
        target: PathBuf,
    },

    /// An external process exited non-zero.
    #[error("{tool} failed (exit {}): {stderr}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ExternalToolFailure {
        /// Label of the invoked command.
        tool: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
}
