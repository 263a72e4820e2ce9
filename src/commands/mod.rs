//! Command handlers wiring configuration, logging and the orchestrator.
pub mod backup;
pub mod restore;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::{self, Configuration};
use crate::exec::Executor;
use crate::logging::{Log, Logger};
use crate::orchestrator::{self, Action, Context, Report};

/// Configuration and backup location resolved for one run.
#[derive(Debug)]
pub struct CommandSetup {
    /// Path the configuration was loaded from.
    pub config_path: PathBuf,
    /// Parsed configuration.
    pub config: Configuration,
    /// Absolute backup folder root.
    pub backup_root: PathBuf,
}

impl CommandSetup {
    /// Locate and load the configuration, then resolve the backup folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is missing, unreadable, or
    /// does not name a backup folder.
    pub fn init(global: &GlobalOpts, home: &Path, log: &dyn Log) -> Result<Self> {
        let config_path = config::resolve_path(global.config.as_deref(), home);
        let config_path = std::path::absolute(&config_path).unwrap_or(config_path);

        log.stage("Loading configuration");
        log.debug(&format!("config file: {}", config_path.display()));
        let config = config::load(&config_path)?;

        let base = config_path.parent().unwrap_or(home);
        let backup_root = config.resolve_backup_folder(base, home);
        log.info(&format!("backup folder: {}", backup_root.display()));

        let modules = config.effective_modules();
        if modules.is_empty() {
            log.info("no modules enabled");
        } else {
            log.info(&format!("modules: {}", modules.join(", ")));
        }

        Ok(Self {
            config_path,
            config,
            backup_root,
        })
    }
}

/// Load the configuration and run `action` for every enabled module.
///
/// Prints the summary and returns the report; per-module failures are in
/// the report, not in the `Err` branch.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run_action(
    action: Action,
    global: &GlobalOpts,
    home: &Path,
    log: &Arc<Logger>,
    executor: Arc<dyn Executor>,
) -> Result<Report> {
    let setup = CommandSetup::init(global, home, &**log)?;
    if global.dry_run {
        log.info("dry run: no changes will be made");
    }

    let ctx = Context::new(
        home.to_path_buf(),
        setup.backup_root,
        Arc::clone(log) as Arc<dyn Log>,
        executor,
        global.dry_run,
    );
    let report = orchestrator::run(&setup.config, action, &ctx);
    report.print_summary(&**log, Some(log.log_path()));
    Ok(report)
}

/// Turn the report into the process exit status.
///
/// # Errors
///
/// Returns an error if one or more modules failed.
pub fn finish(report: &Report) -> Result<()> {
    let count = report.failure_count();
    if count > 0 {
        anyhow::bail!("{count} module(s) failed");
    }
    Ok(())
}
