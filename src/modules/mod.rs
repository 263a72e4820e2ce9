//! Module descriptors and the static registry.
//!
//! A module is a named unit of configuration with its own backup and
//! restore procedure. Adding a module means adding one entry to
//! [`all_modules`].
mod dotfile;
mod package;

pub use dotfile::{DotfileModule, Prerequisite};
pub use package::PackageModule;

use anyhow::Result;

use crate::error::ModuleError;
use crate::gateway::PluginInstall;
use crate::orchestrator::Context;

/// Successful outcome of one module procedure.
///
/// Failures travel as `Err` and are recorded by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleResult {
    /// Procedure completed; the message says what happened.
    Ok(String),
    /// Procedure had nothing it could do, with a reason.
    Skipped(String),
    /// Dry run: decisions were made and logged, nothing was changed.
    DryRun(String),
}

/// A named unit of configuration that can be backed up and restored.
pub trait Module: Send + Sync + std::fmt::Debug {
    /// Registry name, as written in the configuration file.
    fn name(&self) -> &'static str;

    /// Dotfile path relative to the home directory, if the module manages one.
    fn dotfile(&self) -> Option<&'static str>;

    /// Mirror the machine's state for this module into the backup folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be backed up; the batch
    /// continues with the next module.
    fn backup(&self, ctx: &Context) -> Result<ModuleResult>;

    /// Apply the backed-up state for this module to the machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be restored; the batch
    /// continues with the next module.
    fn restore(&self, ctx: &Context) -> Result<ModuleResult>;
}

static BREW: PackageModule = PackageModule { name: "brew" };

static VIM: DotfileModule = DotfileModule {
    name: "vim",
    dotfile: ".vimrc",
    prerequisites: &[Prerequisite {
        name: "Vundle",
        url: "https://github.com/VundleVim/Vundle.vim.git",
        dest: ".vim/bundle/Vundle.vim",
    }],
    plugin_install: Some(PluginInstall::Vundle),
};

static TMUX: DotfileModule = DotfileModule {
    name: "tmux",
    dotfile: ".tmux.conf",
    prerequisites: &[Prerequisite {
        name: "tpm",
        url: "https://github.com/tmux-plugins/tpm",
        dest: ".tmux/plugins/tpm",
    }],
    plugin_install: Some(PluginInstall::Tpm),
};

static ZSH: DotfileModule = DotfileModule {
    name: "zsh",
    dotfile: ".zshrc",
    prerequisites: &[
        Prerequisite {
            name: "oh-my-zsh",
            url: "https://github.com/ohmyzsh/ohmyzsh.git",
            dest: ".oh-my-zsh",
        },
        Prerequisite {
            name: "zplug",
            url: "https://github.com/zplug/zplug",
            dest: ".zplug",
        },
    ],
    plugin_install: Some(PluginInstall::Zplug),
};

static REGISTRY: [&dyn Module; 4] = [&BREW, &VIM, &TMUX, &ZSH];

/// Every supported module, in registry order.
#[must_use]
pub fn all_modules() -> &'static [&'static dyn Module] {
    &REGISTRY
}

/// Find the module registered under `name`.
///
/// # Errors
///
/// Returns [`ModuleError::UnknownModule`] if no module has that name.
///
/// # Examples
///
/// ```
/// use dotbackup::modules::lookup;
///
/// assert_eq!(lookup("tmux").unwrap().dotfile(), Some(".tmux.conf"));
/// assert!(lookup("emacs").is_err());
/// ```
pub fn lookup(name: &str) -> Result<&'static dyn Module, ModuleError> {
    REGISTRY
        .iter()
        .copied()
        .find(|module| module.name() == name)
        .ok_or_else(|| ModuleError::UnknownModule(name.to_string()))
}
