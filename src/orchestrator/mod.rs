//! Batch driver: runs the enabled modules in declaration order and collects
//! a per-module report without stopping at the first failure.
mod context;
mod report;

pub use context::{BREWFILE, Context, STOW_DIR, home_dir};
pub use report::{Report, ReportEntry};

use std::collections::HashSet;
use std::fmt;

use crate::config::Configuration;
use crate::logging::ModuleStatus;
use crate::modules::{self, Module, ModuleResult};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Mirror the machine into the backup folder.
    Backup,
    /// Apply the backup folder to the machine.
    Restore,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backup => write!(f, "backup"),
            Self::Restore => write!(f, "restore"),
        }
    }
}

/// Run `action` for every enabled module of `config`.
///
/// Repeated names run once. Disabled names are recorded as not applicable,
/// unknown names as skipped. A failing module is recorded and the batch
/// moves on.
pub fn run(config: &Configuration, action: Action, ctx: &Context) -> Report {
    let mut report = Report::default();
    let mut seen = HashSet::new();

    for name in &config.enabled_modules {
        if !seen.insert(name.as_str()) {
            ctx.log.debug(&format!("{name} listed more than once, ignoring repeat"));
            continue;
        }
        if config.is_disabled(name) {
            ctx.log.debug(&format!("skipping {name} (disabled)"));
            report.record(name, ModuleStatus::NotApplicable, Some("disabled"));
            continue;
        }
        match modules::lookup(name) {
            Ok(module) => execute(module, action, ctx, &mut report),
            Err(e) => {
                ctx.log.warn(&e.to_string());
                report.record(name, ModuleStatus::Skipped, Some(&e.to_string()));
            }
        }
    }

    report
}

/// Execute one module, recording the result in `report`.
pub fn execute(module: &dyn Module, action: Action, ctx: &Context, report: &mut Report) {
    let name = module.name();
    ctx.log.stage(&format!("{action} {name}"));

    let result = match action {
        Action::Backup => module.backup(ctx),
        Action::Restore => module.restore(ctx),
    };

    match result {
        Ok(ModuleResult::Ok(msg)) => {
            ctx.log.info(&msg);
            report.record(name, ModuleStatus::Ok, Some(&msg));
        }
        Ok(ModuleResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            report.record(name, ModuleStatus::Skipped, Some(&reason));
        }
        Ok(ModuleResult::DryRun(msg)) => {
            report.record(name, ModuleStatus::DryRun, Some(&msg));
        }
        Err(e) => {
            ctx.log.error(&format!("{name}: {e:#}"));
            report.record(name, ModuleStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
