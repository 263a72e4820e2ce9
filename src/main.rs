//! `dotbackup` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dotbackup::cli::{Cli, Command};
use dotbackup::commands;
use dotbackup::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if args.command == Command::Version {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(Logger::new(args.command.name()));
    install_interrupt_handler(&log);

    match args.command {
        Command::Backup => commands::backup::run(&args.global, &log),
        Command::Restore => commands::restore::run(&args.global, &log),
        Command::Version => Ok(()),
    }
}

/// Exit with status 130 on Ctrl-C, leaving the current module as the
/// interrupted tool left it.
fn install_interrupt_handler(log: &Arc<Logger>) {
    let handler_log = Arc::clone(log);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_log.error("interrupted; the current module may be partially applied");
        std::process::exit(130);
    }) {
        log.warn(&format!("cannot install Ctrl-C handler: {e}"));
    }
}
