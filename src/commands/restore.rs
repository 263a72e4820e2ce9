//! Command: restore enabled modules from the backup folder.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::orchestrator::{Action, home_dir};

/// Run the restore command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or any module
/// fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let home = home_dir()?;
    let report = super::run_action(Action::Restore, global, &home, log, Arc::new(SystemExecutor))?;
    super::finish(&report)
}
