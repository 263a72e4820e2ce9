//! The package-manager module: a Brewfile round trip.
use anyhow::{Context as _, Result};

use super::{Module, ModuleResult};
use crate::gateway;
use crate::orchestrator::Context;
use crate::resources::fs;

/// A module backed by `brew bundle` and `<backup>/Brewfile`.
#[derive(Debug)]
pub struct PackageModule {
    /// Registry name.
    pub name: &'static str,
}

impl Module for PackageModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn dotfile(&self) -> Option<&'static str> {
        None
    }

    fn backup(&self, ctx: &Context) -> Result<ModuleResult> {
        if !ctx.executor.which("brew") {
            return Ok(ModuleResult::Skipped("brew is not installed".to_string()));
        }

        let brewfile = ctx.brewfile();
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would dump installed packages to {}", brewfile.display()));
            return Ok(ModuleResult::DryRun("would write Brewfile".to_string()));
        }

        std::fs::create_dir_all(&ctx.backup_root)
            .with_context(|| format!("create backup folder: {}", ctx.backup_root.display()))?;
        gateway::brew_dump(ctx.executor(), &brewfile)?;
        Ok(ModuleResult::Ok(format!("wrote {}", brewfile.display())))
    }

    fn restore(&self, ctx: &Context) -> Result<ModuleResult> {
        let brewfile = ctx.brewfile();
        if fs::is_vacant(&brewfile) {
            return Ok(ModuleResult::Skipped(format!(
                "no Brewfile in {}",
                ctx.backup_root.display()
            )));
        }

        let installed = ctx.executor.which("brew");
        if ctx.dry_run {
            if !installed {
                ctx.log.dry_run("would install Homebrew");
            }
            ctx.log.dry_run(&format!(
                "would install packages from {}",
                brewfile.display()
            ));
            return Ok(ModuleResult::DryRun("would install Brewfile".to_string()));
        }

        if !installed {
            ctx.log.info("installing Homebrew");
            gateway::install_homebrew(ctx.executor()).context("installing Homebrew")?;
        }
        let brew = gateway::locate_brew(ctx.executor())
            .map_or_else(|| "brew".to_string(), |p| p.to_string_lossy().into_owned());
        gateway::brew_install(ctx.executor(), &brew, &brewfile)?;
        Ok(ModuleResult::Ok("installed Brewfile packages".to_string()))
    }
}
