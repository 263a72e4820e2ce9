//! Link state detection for managed dotfiles.
use anyhow::{Context as _, Result};
use std::path::{Component, Path, PathBuf};

/// Relationship between a dotfile path and its managed location.
///
/// Computed fresh for every backup or restore decision; never cached.
///
/// # Examples
///
/// ```
/// use dotbackup::resources::LinkState;
///
/// let unmanaged = LinkState::SymlinkUnmanaged { actual: "/elsewhere/.vimrc".into() };
/// assert_ne!(unmanaged, LinkState::SymlinkManaged);
/// assert_eq!(LinkState::Absent, LinkState::Absent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing exists at the target path.
    Absent,
    /// A real file (or directory) occupies the target path.
    RegularFile,
    /// A symlink resolves to the expected managed path.
    SymlinkManaged,
    /// A symlink resolves somewhere else.
    SymlinkUnmanaged {
        /// Where the link leads: canonical when it resolves, lexically
        /// normalised when it dangles.
        actual: PathBuf,
    },
}

/// Classify `target` against the `expected` managed path.
///
/// A link that resolves on the filesystem is classified by where the kernel
/// sends it, so `..` inside a relative link is taken from the real parent
/// directory. Dangling links fall back to a lexical comparison and count as
/// present.
///
/// # Errors
///
/// Returns an error if the target's metadata or link contents cannot be read
/// for a reason other than the path not existing.
pub fn detect(target: &Path, expected: &Path) -> Result<LinkState> {
    let meta = match std::fs::symlink_metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LinkState::Absent),
        Err(e) => return Err(e).with_context(|| format!("inspect {}", target.display())),
    };

    if !meta.file_type().is_symlink() {
        return Ok(LinkState::RegularFile);
    }

    if let Ok(resolved) = dunce::canonicalize(target) {
        return Ok(match dunce::canonicalize(expected) {
            Ok(managed) if managed == resolved => LinkState::SymlinkManaged,
            _ => LinkState::SymlinkUnmanaged { actual: resolved },
        });
    }

    let link = std::fs::read_link(target)
        .with_context(|| format!("read link: {}", target.display()))?;
    let actual = resolve_link(target, &link);
    if actual == normalize(expected) {
        Ok(LinkState::SymlinkManaged)
    } else {
        Ok(LinkState::SymlinkUnmanaged { actual })
    }
}

/// Resolve the contents of the symlink at `symlink` to a normalised path.
///
/// # Examples
///
/// ```
/// use dotbackup::resources::link::resolve_link;
/// use std::path::{Path, PathBuf};
///
/// let resolved = resolve_link(
///     Path::new("/home/u/.vimrc"),
///     Path::new("../../bak/STOW/vim/.vimrc"),
/// );
/// assert_eq!(resolved, PathBuf::from("/bak/STOW/vim/.vimrc"));
/// ```
#[must_use]
pub fn resolve_link(symlink: &Path, link: &Path) -> PathBuf {
    if link.is_absolute() {
        return normalize(link);
    }
    let dir = symlink.parent().unwrap_or_else(|| Path::new("."));
    normalize(&dir.join(link))
}

/// Lexically normalise a path: drop `.` and fold `..` into its parent.
///
/// `..` at the filesystem root stays at the root; leading `..` in a
/// relative path is kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
