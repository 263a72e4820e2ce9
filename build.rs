//! Build script: embeds the version string.

use std::process::Command;

/// `git describe` of the checkout, when building from one.
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

fn main() {
    // An explicit DOTBACKUP_VERSION (release builds) wins over git describe.
    let version = std::env::var("DOTBACKUP_VERSION").ok().or_else(git_version);
    if let Some(version) = version {
        println!("cargo:rustc-env=DOTBACKUP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DOTBACKUP_VERSION");
}
