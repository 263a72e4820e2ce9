//! Contracts for the external tools driven by module procedures.
//!
//! Each function issues exactly one command line through an [`Executor`];
//! a non-zero exit surfaces as
//! [`ModuleError::ExternalToolFailure`](crate::error::ModuleError::ExternalToolFailure).
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::exec::Executor;

/// Official Homebrew install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Locations the Homebrew installer places `brew` when it is not yet on `PATH`.
const HOMEBREW_BINARIES: [&str; 3] = [
    "/opt/homebrew/bin/brew",
    "/usr/local/bin/brew",
    "/home/linuxbrew/.linuxbrew/bin/brew",
];

/// How `stow` should treat the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StowMode {
    /// Create links for a package that is not linked yet.
    Create,
    /// Remove and recreate the package's links (`--restow`).
    Restow,
}

/// Link `package` from the stow directory `dir` into `target`.
///
/// # Errors
///
/// Returns an error if `stow` cannot be spawned or reports a conflict.
pub fn stow(
    executor: &dyn Executor,
    dir: &Path,
    target: &Path,
    package: &str,
    mode: StowMode,
) -> Result<()> {
    let dir = dir.to_string_lossy();
    let target = target.to_string_lossy();
    let mut args = Vec::with_capacity(6);
    if mode == StowMode::Restow {
        args.push("--restow");
    }
    args.extend(["--dir", &*dir, "--target", &*target, package]);
    executor.run("stow", &args)?;
    Ok(())
}

/// Shallow-clone `url` into `dest`.
///
/// # Errors
///
/// Returns an error if `git` cannot be spawned or the clone fails.
pub fn git_clone(executor: &dyn Executor, url: &str, dest: &Path) -> Result<()> {
    let dest = dest.to_string_lossy();
    executor.run("git", &["clone", "--depth", "1", url, &*dest])?;
    Ok(())
}

/// Write the installed package set to `brewfile`, overwriting it.
///
/// # Errors
///
/// Returns an error if `brew bundle dump` fails.
pub fn brew_dump(executor: &dyn Executor, brewfile: &Path) -> Result<()> {
    let file = brewfile.to_string_lossy();
    executor.run("brew", &["bundle", "dump", "--force", "--file", &*file])?;
    Ok(())
}

/// Install every package listed in `brewfile` using the `brew` at `program`.
///
/// # Errors
///
/// Returns an error if `brew bundle install` fails.
pub fn brew_install(executor: &dyn Executor, program: &str, brewfile: &Path) -> Result<()> {
    let file = brewfile.to_string_lossy();
    executor.run(program, &["bundle", "install", "--file", &*file])?;
    Ok(())
}

/// Run the official Homebrew installer non-interactively.
///
/// # Errors
///
/// Returns an error if the installer exits non-zero.
pub fn install_homebrew(executor: &dyn Executor) -> Result<()> {
    let script = format!("NONINTERACTIVE=1 /bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_URL})\"");
    executor.run("bash", &["-c", &script])?;
    Ok(())
}

/// Find the `brew` binary: `PATH` first, then the installer's default
/// prefixes.
#[must_use]
pub fn locate_brew(executor: &dyn Executor) -> Option<PathBuf> {
    if executor.which("brew") {
        return Some(PathBuf::from("brew"));
    }
    HOMEBREW_BINARIES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Post-link step that lets a plugin manager fetch the plugins named in
/// the freshly linked dotfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginInstall {
    /// `vim +PluginInstall +qall`
    Vundle,
    /// `~/.tmux/plugins/tpm/bin/install_plugins`
    Tpm,
    /// `zsh -c 'source <home>/.zshrc && zplug install'`
    Zplug,
}

impl PluginInstall {
    /// Program and arguments for this step.
    #[must_use]
    pub fn command(self, home: &Path) -> (String, Vec<String>) {
        match self {
            Self::Vundle => (
                "vim".to_string(),
                vec!["+PluginInstall".to_string(), "+qall".to_string()],
            ),
            Self::Tpm => (
                home.join(".tmux/plugins/tpm/bin/install_plugins")
                    .to_string_lossy()
                    .into_owned(),
                vec![],
            ),
            Self::Zplug => (
                "zsh".to_string(),
                vec![
                    "-c".to_string(),
                    format!("source {} && zplug install", home.join(".zshrc").display()),
                ],
            ),
        }
    }

    /// Run this step.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugin manager exits non-zero.
    pub fn run(self, executor: &dyn Executor, home: &Path) -> Result<()> {
        let (program, args) = self.command(home);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        executor.run(&program, &args)?;
        Ok(())
    }
}

impl fmt::Display for PluginInstall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vundle => write!(f, "vim +PluginInstall +qall"),
            Self::Tpm => write!(f, "~/.tmux/plugins/tpm/bin/install_plugins"),
            Self::Zplug => write!(f, "zsh -c 'source ~/.zshrc && zplug install'"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::exec::test_helpers::MockExecutor;

    #[test]
    fn stow_create_command_line() {
        let exec = MockExecutor::new();
        stow(
            &exec,
            Path::new("/bak/STOW"),
            Path::new("/home/u"),
            "vim",
            StowMode::Create,
        )
        .unwrap();
        assert_eq!(
            exec.calls(),
            ["stow --dir /bak/STOW --target /home/u vim"]
        );
    }

    #[test]
    fn stow_restow_command_line() {
        let exec = MockExecutor::new();
        stow(
            &exec,
            Path::new("/bak/STOW"),
            Path::new("/home/u"),
            "tmux",
            StowMode::Restow,
        )
        .unwrap();
        assert_eq!(
            exec.calls(),
            ["stow --restow --dir /bak/STOW --target /home/u tmux"]
        );
    }

    #[test]
    fn stow_failure_is_external_tool_failure() {
        let exec = MockExecutor::new().with_exit_codes(&[1]);
        let err = stow(
            &exec,
            Path::new("/d"),
            Path::new("/t"),
            "vim",
            StowMode::Create,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModuleError>(),
            Some(ModuleError::ExternalToolFailure { tool, code: Some(1), .. }) if tool == "stow"
        ));
    }

    #[test]
    fn git_clone_is_shallow() {
        let exec = MockExecutor::new();
        git_clone(&exec, "https://example.com/tpm", Path::new("/h/.tmux/plugins/tpm")).unwrap();
        assert_eq!(
            exec.calls(),
            ["git clone --depth 1 https://example.com/tpm /h/.tmux/plugins/tpm"]
        );
    }

    #[test]
    fn brew_commands() {
        let exec = MockExecutor::new();
        brew_dump(&exec, Path::new("/bak/Brewfile")).unwrap();
        brew_install(&exec, "brew", Path::new("/bak/Brewfile")).unwrap();
        assert_eq!(
            exec.calls(),
            [
                "brew bundle dump --force --file /bak/Brewfile",
                "brew bundle install --file /bak/Brewfile",
            ]
        );
    }

    #[test]
    fn homebrew_installer_fetches_official_script() {
        let exec = MockExecutor::new();
        install_homebrew(&exec).unwrap();
        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("bash -c NONINTERACTIVE=1"));
        assert!(calls[0].contains(HOMEBREW_INSTALL_URL));
    }

    #[test]
    fn locate_brew_prefers_path() {
        let exec = MockExecutor::new().with_program("brew");
        assert_eq!(locate_brew(&exec), Some(PathBuf::from("brew")));
    }

    #[test]
    fn plugin_commands() {
        let home = Path::new("/home/u");
        let exec = MockExecutor::new();
        PluginInstall::Vundle.run(&exec, home).unwrap();
        PluginInstall::Tpm.run(&exec, home).unwrap();
        PluginInstall::Zplug.run(&exec, home).unwrap();
        assert_eq!(
            exec.calls(),
            [
                "vim +PluginInstall +qall",
                "/home/u/.tmux/plugins/tpm/bin/install_plugins",
                "zsh -c source /home/u/.zshrc && zplug install",
            ]
        );
    }

    #[test]
    fn plugin_steps_use_the_given_home() {
        let home = Path::new("/srv/other-home");
        let (tpm, _) = PluginInstall::Tpm.command(home);
        let (zsh, args) = PluginInstall::Zplug.command(home);
        assert_eq!(tpm, "/srv/other-home/.tmux/plugins/tpm/bin/install_plugins");
        assert_eq!(zsh, "zsh");
        assert_eq!(args, ["-c", "source /srv/other-home/.zshrc && zplug install"]);
    }

    #[test]
    fn plugin_display() {
        assert_eq!(PluginInstall::Vundle.to_string(), "vim +PluginInstall +qall");
        assert_eq!(
            PluginInstall::Zplug.to_string(),
            "zsh -c 'source ~/.zshrc && zplug install'"
        );
    }
}
