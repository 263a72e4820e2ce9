//! Modules that manage a single dotfile through stow.
use anyhow::{Context as _, Result};

use super::{Module, ModuleResult};
use crate::error::ModuleError;
use crate::gateway::{self, PluginInstall, StowMode};
use crate::orchestrator::Context;
use crate::resources::{LinkState, detect, fs};

/// A plugin manager cloned into the home directory before a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prerequisite {
    /// Display name.
    pub name: &'static str,
    /// Git repository to clone.
    pub url: &'static str,
    /// Clone destination relative to the home directory.
    pub dest: &'static str,
}

/// A module whose state is one dotfile linked from `STOW/<name>/`.
#[derive(Debug)]
pub struct DotfileModule {
    /// Registry name; also the stow package name.
    pub name: &'static str,
    /// Dotfile path relative to the home directory.
    pub dotfile: &'static str,
    /// Installers cloned (when absent) before linking on restore.
    pub prerequisites: &'static [Prerequisite],
    /// Plugin install step run after linking on restore.
    pub plugin_install: Option<PluginInstall>,
}

impl DotfileModule {
    /// Clone every prerequisite whose destination does not exist yet.
    fn install_prerequisites(&self, ctx: &Context) -> Result<()> {
        for prereq in self.prerequisites {
            let dest = ctx.home_path(prereq.dest);
            if !fs::is_vacant(&dest) {
                ctx.log.debug(&format!(
                    "{} already present at {}",
                    prereq.name,
                    ctx.display_path(&dest)
                ));
                continue;
            }
            ctx.log.info(&format!(
                "cloning {} into {}",
                prereq.name,
                ctx.display_path(&dest)
            ));
            fs::ensure_parent_dir(&dest)?;
            gateway::git_clone(ctx.executor(), prereq.url, &dest)
                .with_context(|| format!("installing {}", prereq.name))?;
        }
        Ok(())
    }

    /// Log every mutation a restore would perform.
    fn preview_restore(&self, ctx: &Context) {
        for prereq in self.prerequisites {
            let dest = ctx.home_path(prereq.dest);
            if fs::is_vacant(&dest) {
                ctx.log.dry_run(&format!(
                    "would clone {} into {}",
                    prereq.url,
                    ctx.display_path(&dest)
                ));
            }
        }
        ctx.log
            .dry_run(&format!("would restow {} into ~", self.name));
        if let Some(step) = self.plugin_install {
            ctx.log.dry_run(&format!("would run {step}"));
        }
    }
}

impl Module for DotfileModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn dotfile(&self) -> Option<&'static str> {
        Some(self.dotfile)
    }

    fn backup(&self, ctx: &Context) -> Result<ModuleResult> {
        let target = ctx.home_path(self.dotfile);
        let managed = ctx.managed_path(self.name, self.dotfile);

        match detect(&target, &managed)? {
            LinkState::SymlinkManaged => Ok(ModuleResult::Ok(format!(
                "{} already managed",
                self.dotfile
            ))),
            LinkState::SymlinkUnmanaged { actual } => Err(ModuleError::ConflictingSymlink {
                target,
                expected: managed,
                actual,
            }
            .into()),
            LinkState::Absent => Ok(ModuleResult::Ok(format!(
                "nothing to back up: {} does not exist",
                ctx.display_path(&target)
            ))),
            LinkState::RegularFile => {
                if ctx.dry_run {
                    ctx.log.dry_run(&format!(
                        "would move {} to {} and link it back",
                        ctx.display_path(&target),
                        managed.display()
                    ));
                    return Ok(ModuleResult::DryRun(format!("would back up {}", self.dotfile)));
                }

                if !fs::is_vacant(&managed) {
                    ctx.log.warn(&format!(
                        "replacing existing backup {} with {}",
                        managed.display(),
                        ctx.display_path(&target)
                    ));
                }
                ctx.log.debug(&format!(
                    "moving {} to {}",
                    target.display(),
                    managed.display()
                ));
                fs::move_file(&target, &managed)?;

                if let Err(e) = gateway::stow(
                    ctx.executor(),
                    &ctx.stow_dir(),
                    &ctx.home,
                    self.name,
                    StowMode::Create,
                ) {
                    if fs::is_vacant(&target) {
                        match fs::move_file(&managed, &target) {
                            Ok(()) => ctx.log.warn(&format!(
                                "linking failed, moved {} back",
                                ctx.display_path(&target)
                            )),
                            Err(undo) => ctx.log.error(&format!(
                                "could not move {} back to {}: {undo:#}",
                                managed.display(),
                                target.display()
                            )),
                        }
                    }
                    return Err(e.context(format!("linking {}", self.dotfile)));
                }

                Ok(ModuleResult::Ok(format!("backed up {}", self.dotfile)))
            }
        }
    }

    fn restore(&self, ctx: &Context) -> Result<ModuleResult> {
        let target = ctx.home_path(self.dotfile);
        let managed = ctx.managed_path(self.name, self.dotfile);

        match detect(&target, &managed)? {
            LinkState::RegularFile => {
                return Err(ModuleError::UnresolvableConflict { target }.into());
            }
            LinkState::SymlinkManaged => {
                return Ok(ModuleResult::Ok(format!(
                    "{} already managed",
                    self.dotfile
                )));
            }
            LinkState::SymlinkUnmanaged { actual } => ctx.log.warn(&format!(
                "{} links to {}, restowing anyway",
                ctx.display_path(&target),
                actual.display()
            )),
            LinkState::Absent => {}
        }

        if fs::is_vacant(&managed) {
            return Ok(ModuleResult::Skipped(format!(
                "no backup for {} in {}",
                self.dotfile,
                ctx.stow_dir().display()
            )));
        }

        if ctx.dry_run {
            self.preview_restore(ctx);
            return Ok(ModuleResult::DryRun(format!("would restore {}", self.dotfile)));
        }

        self.install_prerequisites(ctx)?;
        gateway::stow(
            ctx.executor(),
            &ctx.stow_dir(),
            &ctx.home,
            self.name,
            StowMode::Restow,
        )
        .with_context(|| format!("linking {}", self.dotfile))?;
        if let Some(step) = self.plugin_install {
            ctx.log.info(&format!("running {step}"));
            step.run(ctx.executor(), &ctx.home)
                .with_context(|| format!("installing {} plugins", self.name))?;
        }

        Ok(ModuleResult::Ok(format!("restored {}", self.dotfile)))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use crate::orchestrator::test_helpers::Sandbox;
    use std::os::unix::fs::symlink;
    use std::sync::Arc;

    static VIM: DotfileModule = DotfileModule {
        name: "vim",
        dotfile: ".vimrc",
        prerequisites: &[Prerequisite {
            name: "Vundle",
            url: "https://example.com/Vundle.vim.git",
            dest: ".vim/bundle/Vundle.vim",
        }],
        plugin_install: Some(PluginInstall::Vundle),
    };

    // ------------------------------------------------------------------
    // backup
    // ------------------------------------------------------------------

    #[test]
    fn backup_absent_creates_nothing() {
        let sandbox = Sandbox::new();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.backup(&ctx).unwrap();

        assert!(matches!(result, ModuleResult::Ok(ref m) if m.contains("nothing to back up")));
        assert!(exec.calls().is_empty());
        assert!(!sandbox.backup.join("STOW").exists());
    }

    #[test]
    fn backup_regular_file_moves_and_stows() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.backup(&ctx).unwrap();

        assert_eq!(result, ModuleResult::Ok("backed up .vimrc".to_string()));
        let managed = sandbox.backup.join("STOW/vim/.vimrc");
        assert_eq!(std::fs::read_to_string(managed).unwrap(), "syntax on");
        assert_eq!(
            exec.calls(),
            [format!(
                "stow --dir {} --target {} vim",
                sandbox.backup.join("STOW").display(),
                sandbox.home.display()
            )]
        );
    }

    #[test]
    fn backup_over_existing_copy_warns_and_replaces_it() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "local");
        let managed = sandbox.write_backup("STOW/vim/.vimrc", "from another machine");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        VIM.backup(&ctx).unwrap();

        let warnings = sandbox.log.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(&managed.display().to_string()));
        assert_eq!(std::fs::read_to_string(&managed).unwrap(), "local");
    }

    #[test]
    fn backup_into_empty_package_does_not_warn() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "local");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        VIM.backup(&ctx).unwrap();

        assert!(sandbox.log.warnings().is_empty());
    }

    #[test]
    fn backup_failed_stow_moves_file_back() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new().with_exit_codes(&[1]));
        let ctx = sandbox.context(&exec, false);

        let err = VIM.backup(&ctx).unwrap_err();

        assert!(format!("{err:#}").contains("stow failed"));
        assert_eq!(
            std::fs::read_to_string(sandbox.home.join(".vimrc")).unwrap(),
            "syntax on"
        );
        assert!(!sandbox.backup.join("STOW/vim/.vimrc").exists());
    }

    #[test]
    fn backup_managed_symlink_is_noop() {
        let sandbox = Sandbox::new();
        let managed = sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        symlink(&managed, sandbox.home.join(".vimrc")).unwrap();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.backup(&ctx).unwrap();

        assert_eq!(result, ModuleResult::Ok(".vimrc already managed".to_string()));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn backup_unmanaged_symlink_conflicts() {
        let sandbox = Sandbox::new();
        let other = sandbox.write_home("dotfiles/vimrc", "x");
        symlink(&other, sandbox.home.join(".vimrc")).unwrap();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let err = VIM.backup(&ctx).unwrap_err();

        match err.downcast_ref::<ModuleError>() {
            Some(ModuleError::ConflictingSymlink { actual, expected, .. }) => {
                assert_eq!(actual, &dunce::canonicalize(&other).unwrap());
                assert_eq!(expected, &sandbox.backup.join("STOW/vim/.vimrc"));
            }
            other => panic!("expected ConflictingSymlink, got {other:?}"),
        }
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn backup_dry_run_mutates_nothing() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, true);

        let result = VIM.backup(&ctx).unwrap();

        assert!(matches!(result, ModuleResult::DryRun(_)));
        assert!(sandbox.home.join(".vimrc").is_file());
        assert!(!sandbox.backup.join("STOW").exists());
        assert!(exec.calls().is_empty());
    }

    // ------------------------------------------------------------------
    // restore
    // ------------------------------------------------------------------

    #[test]
    fn restore_regular_file_is_unresolvable() {
        let sandbox = Sandbox::new();
        sandbox.write_home(".vimrc", "local");
        sandbox.write_backup("STOW/vim/.vimrc", "backed up");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let err = VIM.restore(&ctx).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ModuleError>(),
            Some(ModuleError::UnresolvableConflict { .. })
        ));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn restore_managed_symlink_is_noop() {
        let sandbox = Sandbox::new();
        let managed = sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        symlink(&managed, sandbox.home.join(".vimrc")).unwrap();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.restore(&ctx).unwrap();

        assert_eq!(result, ModuleResult::Ok(".vimrc already managed".to_string()));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn restore_absent_clones_stows_and_installs_plugins() {
        let sandbox = Sandbox::new();
        sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.restore(&ctx).unwrap();

        assert_eq!(result, ModuleResult::Ok("restored .vimrc".to_string()));
        assert_eq!(
            exec.calls(),
            [
                format!(
                    "git clone --depth 1 https://example.com/Vundle.vim.git {}",
                    sandbox.home.join(".vim/bundle/Vundle.vim").display()
                ),
                format!(
                    "stow --restow --dir {} --target {} vim",
                    sandbox.backup.join("STOW").display(),
                    sandbox.home.display()
                ),
                "vim +PluginInstall +qall".to_string(),
            ]
        );
        assert!(sandbox.home.join(".vim/bundle").is_dir());
    }

    #[test]
    fn restore_skips_prerequisite_already_present() {
        let sandbox = Sandbox::new();
        sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        std::fs::create_dir_all(sandbox.home.join(".vim/bundle/Vundle.vim")).unwrap();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        VIM.restore(&ctx).unwrap();

        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("stow --restow"));
        assert_eq!(calls[1], "vim +PluginInstall +qall");
    }

    #[test]
    fn restore_unmanaged_symlink_still_restows() {
        let sandbox = Sandbox::new();
        sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        symlink(sandbox.home.join("missing"), sandbox.home.join(".vimrc")).unwrap();
        std::fs::create_dir_all(sandbox.home.join(".vim/bundle/Vundle.vim")).unwrap();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        VIM.restore(&ctx).unwrap();

        assert!(exec.calls()[0].starts_with("stow --restow"));
    }

    #[test]
    fn restore_without_backup_is_skipped() {
        let sandbox = Sandbox::new();
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, false);

        let result = VIM.restore(&ctx).unwrap();

        assert!(matches!(result, ModuleResult::Skipped(ref r) if r.contains("no backup")));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn restore_clone_failure_stops_before_stow() {
        let sandbox = Sandbox::new();
        sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new().with_exit_codes(&[128]));
        let ctx = sandbox.context(&exec, false);

        let err = VIM.restore(&ctx).unwrap_err();

        assert!(format!("{err:#}").contains("installing Vundle"));
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn restore_dry_run_mutates_nothing() {
        let sandbox = Sandbox::new();
        sandbox.write_backup("STOW/vim/.vimrc", "syntax on");
        let exec = Arc::new(MockExecutor::new());
        let ctx = sandbox.context(&exec, true);

        let result = VIM.restore(&ctx).unwrap();

        assert!(matches!(result, ModuleResult::DryRun(_)));
        assert!(exec.calls().is_empty());
        assert!(!sandbox.home.join(".vim").exists());
    }
}
