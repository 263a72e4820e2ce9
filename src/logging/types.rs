//! Core logging types: module status and the [`Log`] trait.

/// Outcome category of one module in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Module completed successfully (including "already managed").
    Ok,
    /// Module was listed but disabled in the configuration.
    NotApplicable,
    /// Module was skipped (unknown name, tool missing, nothing in the backup).
    Skipped,
    /// Module ran in dry-run mode; no changes were applied.
    DryRun,
    /// Module encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing`; tests may supply
/// their own implementation to capture messages.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}
