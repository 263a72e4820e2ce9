//! Declarative configuration: which backup folder to use and which modules
//! are enabled.
mod parser;

pub use parser::parse;

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "DOTBACKUP_CONFIG";

/// Parsed configuration file.
///
/// Built once by [`parse`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Root of the backup folder, as written in the file.
    pub backup_folder: PathBuf,
    /// Enabled module names in declaration order (duplicates preserved).
    pub enabled_modules: Vec<String>,
    /// Disabled module names.
    pub disabled_modules: BTreeSet<String>,
}

impl Configuration {
    /// Whether `name` is listed as disabled.
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_modules.contains(name)
    }

    /// Enabled modules that will actually run: declaration order, first
    /// occurrence only, disabled names removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotbackup::config::parse;
    ///
    /// let config = parse(
    ///     "BackupFolder: b\nEnabled\n- vim\n- zsh\n- vim\nDisabled\n- zsh\n",
    /// ).unwrap();
    /// assert_eq!(config.effective_modules(), ["vim"]);
    /// ```
    #[must_use]
    pub fn effective_modules(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.enabled_modules
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name) && !self.is_disabled(name))
            .collect()
    }

    /// Resolve [`backup_folder`](Self::backup_folder) to an absolute path.
    ///
    /// A leading `~` expands to `home`; any other relative path is taken
    /// relative to `base` (the directory holding the configuration file).
    #[must_use]
    pub fn resolve_backup_folder(&self, base: &Path, home: &Path) -> PathBuf {
        let raw = &self.backup_folder;
        if let Ok(rest) = raw.strip_prefix("~") {
            return home.join(rest);
        }
        if raw.is_absolute() {
            raw.clone()
        } else {
            base.join(raw)
        }
    }
}

/// Renders the configuration in the file grammar accepted by [`parse`].
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BackupFolder: {}", self.backup_folder.display())?;
        writeln!(f, "Enabled:")?;
        for name in &self.enabled_modules {
            writeln!(f, "- {name}")?;
        }
        writeln!(f, "Disabled:")?;
        for name in &self.disabled_modules {
            writeln!(f, "- {name}")?;
        }
        Ok(())
    }
}

/// Read and parse the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if `path` does not exist,
/// [`ConfigError::Io`] if it cannot be read, and
/// [`ConfigError::MissingBackupFolder`] if it does not name a backup folder.
pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// Locate the configuration file.
///
/// Precedence: explicit `--config` override, then the `DOTBACKUP_CONFIG`
/// environment variable, then `$XDG_CONFIG_HOME/dotbackup/config`
/// (`~/.config/dotbackup/config` when unset).
#[must_use]
pub fn resolve_path(explicit: Option<&Path>, home: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".config"), PathBuf::from);
    config_home.join("dotbackup").join("config")
}
