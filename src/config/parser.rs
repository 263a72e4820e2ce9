//! Line-oriented parser for the configuration file.
//!
//! ```text
//! BackupFolder: ~/dotfiles-backup
//!
//! Enabled:
//! - brew
//! - vim
//!
//! Disabled
//! - zsh
//! ```
//!
//! Section headers may carry a trailing `:`. Blank lines, comments, and any
//! unrecognised line are ignored.
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::Configuration;
use crate::error::ConfigError;

const BACKUP_FOLDER_KEY: &str = "BackupFolder:";

/// The list currently receiving `- name` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Enabled,
    Disabled,
}

/// Parse configuration text into a [`Configuration`].
///
/// # Examples
///
/// ```
/// use dotbackup::config::parse;
///
/// let config = parse("BackupFolder: /tmp/bak\nEnabled:\n- vim\n- tmux\n").unwrap();
/// assert_eq!(config.backup_folder.to_str(), Some("/tmp/bak"));
/// assert_eq!(config.enabled_modules, ["vim", "tmux"]);
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::MissingBackupFolder`] if no non-empty
/// `BackupFolder:` line is present.
pub fn parse(text: &str) -> Result<Configuration, ConfigError> {
    let mut backup_folder = String::new();
    let mut enabled = Vec::new();
    let mut disabled = BTreeSet::new();
    let mut section = Section::None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix(BACKUP_FOLDER_KEY) {
            backup_folder = rest.trim().to_string();
            section = Section::None;
            continue;
        }

        if let Some(header) = parse_section_header(trimmed) {
            section = header;
            continue;
        }

        let Some(name) = parse_list_item(trimmed) else {
            continue;
        };
        match section {
            Section::Enabled => enabled.push(name.to_string()),
            Section::Disabled => {
                disabled.insert(name.to_string());
            }
            Section::None => {}
        }
    }

    if backup_folder.is_empty() {
        return Err(ConfigError::MissingBackupFolder);
    }

    Ok(Configuration {
        backup_folder: PathBuf::from(backup_folder),
        enabled_modules: enabled,
        disabled_modules: disabled,
    })
}

/// Recognise `Enabled` / `Disabled` headers, with or without a trailing colon.
fn parse_section_header(line: &str) -> Option<Section> {
    match line.strip_suffix(':').unwrap_or(line).trim_end() {
        "Enabled" => Some(Section::Enabled),
        "Disabled" => Some(Section::Disabled),
        _ => None,
    }
}

/// Extract the name from a `- name` list item.
fn parse_list_item(line: &str) -> Option<&str> {
    let name = line.strip_prefix('-')?.trim();
    (!name.is_empty()).then_some(name)
}
