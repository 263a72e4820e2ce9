//! Structured logger that forwards to `tracing`.
use std::path::{Path, PathBuf};

use super::types::Log;
use super::utils::log_file_path;

/// Target used for stage headers, rendered as `==> msg`.
pub(super) const STAGE_TARGET: &str = "dotbackup::stage";
/// Target used for dry-run previews, rendered as `[DRY RUN] msg`.
pub(super) const DRY_RUN_TARGET: &str = "dotbackup::dry_run";

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness.
///
/// Every message becomes a `tracing` event. The subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them on
/// the console and appends them to `$XDG_CACHE_HOME/dotbackup/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
}

impl Logger {
    /// Create a new logger for `command` (e.g. `"backup"`).
    ///
    /// Only records the log file path for the run summary; the file and its
    /// directory are created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: log_file_path(command),
        }
    }

    /// Path of the persistent log file.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_file
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);
}
