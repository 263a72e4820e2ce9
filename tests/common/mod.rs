// Shared helpers for integration tests.
//
// Provides an isolated home directory plus configuration file, and a
// scripted executor that emulates GNU stow closely enough for the link
// detector to see real symlinks.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotbackup::cli::GlobalOpts;
use dotbackup::commands;
use dotbackup::exec::{ExecResult, Executor};
use dotbackup::logging::Logger;
use dotbackup::orchestrator::{Action, Report};

/// Executor that records every command and performs the filesystem side
/// effects of `stow` and `git clone`; every other program just succeeds.
#[derive(Debug, Default)]
pub struct FakeTools {
    calls: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<String>>,
    on_path: Vec<String>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `which(program)` succeed.
    pub fn with_program(mut self, program: &str) -> Self {
        self.on_path.push(program.to_string());
        self
    }

    /// Make the next invocation of `program` exit 1.
    pub fn failing(self, program: &str) -> Self {
        self.failures
            .lock()
            .expect("lock failures")
            .push_back(program.to_string());
        self
    }

    /// Every command line issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock calls").clone()
    }

    /// Command lines issued for `program`.
    pub fn calls_to(&self, program: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(program))
            .collect()
    }

    fn take_failure(&self, program: &str) -> bool {
        let mut failures = self.failures.lock().expect("lock failures");
        if let Some(pos) = failures.iter().position(|p| p == program) {
            failures.remove(pos);
            return true;
        }
        false
    }

    fn dispatch(&self, program: &str, args: &[&str]) -> ExecResult {
        self.calls
            .lock()
            .expect("lock calls")
            .push(std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" "));

        if self.take_failure(program) {
            return result(Err(format!("{program}: scripted failure")));
        }
        match program {
            "stow" => result(fake_stow(args)),
            "git" => result(fake_clone(args)),
            _ => result(Ok(())),
        }
    }
}

impl Executor for FakeTools {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.dispatch(program, args).check(program)
    }

    fn which(&self, program: &str) -> bool {
        self.on_path.iter().any(|p| p == program)
    }
}

fn result(outcome: Result<(), String>) -> ExecResult {
    match outcome {
        Ok(()) => ExecResult {
            stderr: String::new(),
            success: true,
            code: Some(0),
        },
        Err(stderr) => ExecResult {
            stderr,
            success: false,
            code: Some(1),
        },
    }
}

/// `stow [--restow] --dir D --target T PACKAGE`: link every top-level file
/// of `D/PACKAGE` into `T` with a relative symlink, refusing to replace
/// anything stow does not own.
fn fake_stow(args: &[&str]) -> Result<(), String> {
    let mut dir = None;
    let mut target = None;
    let mut package = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--restow" => {}
            "--dir" => dir = iter.next().map(PathBuf::from),
            "--target" => target = iter.next().map(PathBuf::from),
            other => package = Some(other.to_string()),
        }
    }
    let (dir, target, package) = match (dir, target, package) {
        (Some(d), Some(t), Some(p)) => (d, t, p),
        _ => return Err(format!("bad stow arguments: {args:?}")),
    };

    let package_dir = dir.join(&package);
    let entries = std::fs::read_dir(&package_dir).map_err(|e| e.to_string())?;
    for entry in entries {
        let entry = entry.map_err(|e| e.to_string())?;
        let link = target.join(entry.file_name());
        let source = entry.path();
        if let Ok(meta) = link.symlink_metadata() {
            let owned = meta.file_type().is_symlink()
                && std::fs::read_link(&link)
                    .map(|dest| normalize(&target.join(dest)) == source)
                    .unwrap_or(false);
            if !owned {
                return Err(format!(
                    "existing target is not owned by stow: {}",
                    link.display()
                ));
            }
            std::fs::remove_file(&link).map_err(|e| e.to_string())?;
        }
        std::os::unix::fs::symlink(relative_to(&target, &source), &link)
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// `git clone --depth 1 URL DEST`: create `DEST`.
fn fake_clone(args: &[&str]) -> Result<(), String> {
    let dest = args.last().ok_or("missing clone destination")?;
    std::fs::create_dir_all(dest).map_err(|e| e.to_string())
}

/// Path of `to` relative to the directory `from` (both absolute).
fn relative_to(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for part in &to_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// An isolated machine: a home directory and a configuration file, backed
/// by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary root holding `home/` and the config file.
    pub root: tempfile::TempDir,
    /// Stand-in for `$HOME`.
    pub home: PathBuf,
    /// Path of the configuration file.
    pub config_path: PathBuf,
    /// Scripted external tools.
    pub tools: Arc<FakeTools>,
}

impl IntegrationTestContext {
    /// Backup folder named `cfgbak` next to the home directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.path().join("cfgbak")
    }

    /// Path of `relative` inside the home directory.
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }

    /// Run `action` through the command layer.
    pub fn run(&self, action: Action) -> anyhow::Result<Report> {
        self.run_with(action, false)
    }

    /// Run `action` through the command layer, optionally as a dry run.
    pub fn run_with(&self, action: Action, dry_run: bool) -> anyhow::Result<Report> {
        let global = GlobalOpts {
            config: Some(self.config_path.clone()),
            dry_run,
        };
        let log = Arc::new(Logger::new("test"));
        commands::run_action(
            action,
            &global,
            &self.home,
            &log,
            Arc::clone(&self.tools) as Arc<dyn Executor>,
        )
    }

    /// Snapshot of every file, directory and link under the sandbox root.
    pub fn tree(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk(self.root.path(), self.root.path(), &mut out);
        out.sort();
        out
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(&path).display().to_string();
        let meta = path.symlink_metadata().expect("stat entry");
        if meta.file_type().is_symlink() {
            let dest = std::fs::read_link(&path).expect("read link");
            out.push(format!("{rel} -> {}", dest.display()));
        } else if meta.is_dir() {
            out.push(format!("{rel}/"));
            walk(root, &path, out);
        } else {
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            out.push(format!("{rel} = {contents}"));
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    root: tempfile::TempDir,
    config: String,
    tools: FakeTools,
}

impl TestContextBuilder {
    /// Begin with an empty home and `BackupFolder: cfgbak` (relative to the
    /// config file) with no modules enabled.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        Self {
            root,
            config: "BackupFolder: cfgbak\n".to_string(),
            tools: FakeTools::new(),
        }
    }

    /// Append `Enabled` entries to the configuration.
    pub fn enabled(mut self, modules: &[&str]) -> Self {
        self.config.push_str("Enabled:\n");
        for module in modules {
            self.config.push_str(&format!("- {module}\n"));
        }
        self
    }

    /// Append `Disabled` entries to the configuration.
    pub fn disabled(mut self, modules: &[&str]) -> Self {
        self.config.push_str("Disabled:\n");
        for module in modules {
            self.config.push_str(&format!("- {module}\n"));
        }
        self
    }

    /// Write a regular file into the home directory.
    pub fn with_home_file(self, relative: &str, contents: &str) -> Self {
        write(&self.root.path().join("home").join(relative), contents);
        self
    }

    /// Write a file into the backup folder.
    pub fn with_backup_file(self, relative: &str, contents: &str) -> Self {
        write(&self.root.path().join("cfgbak").join(relative), contents);
        self
    }

    /// Replace the scripted tools.
    pub fn with_tools(mut self, tools: FakeTools) -> Self {
        self.tools = tools;
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        let config_path = self.root.path().join("config");
        std::fs::write(&config_path, &self.config).expect("write config");
        let home = self.root.path().join("home");
        IntegrationTestContext {
            root: self.root,
            home,
            config_path,
            tools: Arc::new(self.tools),
        }
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}
