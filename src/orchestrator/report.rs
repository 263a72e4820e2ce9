use std::path::Path;

use crate::logging::{Log, ModuleStatus};

/// Outcome of one module in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Module name as written in the configuration.
    pub module: String,
    /// Outcome category.
    pub status: ModuleStatus,
    /// What happened, or why the module was skipped or failed.
    pub message: Option<String>,
}

/// Ordered per-module outcomes of one backup or restore run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Record the outcome for `module`.
    pub fn record(&mut self, module: &str, status: ModuleStatus, message: Option<&str>) {
        self.entries.push(ReportEntry {
            module: module.to_string(),
            status,
            message: message.map(String::from),
        });
    }

    /// Entries in the order modules were processed.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Number of entries with `status`.
    #[must_use]
    pub fn count(&self, status: ModuleStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Number of modules that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(ModuleStatus::Failed)
    }

    /// Status recorded for `module`, if it was processed.
    #[must_use]
    pub fn status_of(&self, module: &str) -> Option<ModuleStatus> {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .map(|e| e.status)
    }

    /// Print one line per module followed by the per-status counts.
    pub fn print_summary(&self, log: &dyn Log, log_file: Option<&Path>) {
        if self.entries.is_empty() {
            log.info("no modules enabled");
            return;
        }

        log.stage("Summary");
        for entry in &self.entries {
            let (icon, color) = match entry.status {
                ModuleStatus::Ok => ("✓", "\x1b[32m"),
                ModuleStatus::NotApplicable => ("·", "\x1b[2m"),
                ModuleStatus::Skipped => ("○", "\x1b[33m"),
                ModuleStatus::DryRun => ("~", "\x1b[37m"),
                ModuleStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            log.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.module));
        }

        log.info(&format!(
            "{} modules: \x1b[32m{} ok\x1b[0m, \x1b[2m{} n/a\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            self.entries.len(),
            self.count(ModuleStatus::Ok),
            self.count(ModuleStatus::NotApplicable),
            self.count(ModuleStatus::Skipped),
            self.count(ModuleStatus::DryRun),
            self.failure_count(),
        ));

        if let Some(path) = log_file {
            log.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::orchestrator::test_helpers::CaptureLog;

    fn sample() -> Report {
        let mut report = Report::default();
        report.record("brew", ModuleStatus::Skipped, Some("brew is not installed"));
        report.record("vim", ModuleStatus::Ok, Some("backed up .vimrc"));
        report.record("tmux", ModuleStatus::Failed, Some("stow failed"));
        report.record("zsh", ModuleStatus::NotApplicable, Some("disabled"));
        report
    }

    #[test]
    fn counts_by_status() {
        let report = sample();
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.count(ModuleStatus::Ok), 1);
        assert_eq!(report.count(ModuleStatus::DryRun), 0);
        assert_eq!(report.status_of("zsh"), Some(ModuleStatus::NotApplicable));
        assert_eq!(report.status_of("emacs"), None);
    }

    #[test]
    fn entries_keep_processing_order() {
        let names: Vec<_> = sample()
            .entries()
            .iter()
            .map(|e| e.module.clone())
            .collect();
        assert_eq!(names, ["brew", "vim", "tmux", "zsh"]);
    }

    #[test]
    fn summary_lists_every_module_and_totals() {
        let log = CaptureLog::default();
        sample().print_summary(&log, Some(Path::new("/cache/dotbackup/backup.log")));
        let lines = log.lines();

        assert_eq!(lines[0], "==> Summary");
        assert!(lines[1].contains("○ brew (brew is not installed)"));
        assert!(lines[2].contains("✓ vim (backed up .vimrc)"));
        assert!(lines[3].contains("✗ tmux (stow failed)"));
        assert!(lines[4].contains("· zsh (disabled)"));
        assert!(lines[5].starts_with("4 modules:"));
        assert!(lines[5].contains("1 failed"));
        assert!(lines[6].contains("log: /cache/dotbackup/backup.log"));
    }

    #[test]
    fn empty_summary() {
        let log = CaptureLog::default();
        Report::default().print_summary(&log, None);
        assert_eq!(log.lines(), ["no modules enabled"]);
    }
}
