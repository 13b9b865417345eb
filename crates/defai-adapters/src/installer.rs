//! npm and npx as subprocesses: dependency installation, the test runner
//! and the Node.js version lookup.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::bundler::NPX;

#[cfg(windows)]
pub const NPM: &str = "npm.cmd";
#[cfg(not(windows))]
pub const NPM: &str = "npm";

/// Lines of stderr kept in [`InstallError::Failed`].
const STDERR_TAIL: usize = 20;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed{}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl InstallError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Spawn { .. } => vec![
                "Install Node.js 18 or later from https://nodejs.org".into(),
                "Make sure 'npm' and 'npx' are on your PATH".into(),
            ],
            Self::Failed { .. } => vec![],
        }
    }
}

/// Flags of the `test` verb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestOptions {
    pub watch: bool,
    pub coverage: bool,
    pub e2e: bool,
}

impl TestOptions {
    /// Arguments after `npx`: playwright for end-to-end runs, jest otherwise.
    pub fn npx_args(&self) -> Vec<&'static str> {
        if self.e2e {
            return vec!["playwright", "test"];
        }
        let mut args = vec!["jest"];
        if self.watch {
            args.push("--watch");
        }
        if self.coverage {
            args.push("--coverage");
        }
        args
    }
}

#[derive(Debug, Clone)]
pub struct PackageManager {
    npm: PathBuf,
    npx: PathBuf,
}

impl Default for PackageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManager {
    pub fn new() -> Self {
        Self::with_programs(NPM, NPX)
    }

    /// Use other executables, e.g. a pinned npm or a stub in tests.
    pub fn with_programs(npm: impl Into<PathBuf>, npx: impl Into<PathBuf>) -> Self {
        Self {
            npm: npm.into(),
            npx: npx.into(),
        }
    }

    /// `npm install` in `dir`, output captured.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn install(&self, dir: &Path) -> Result<(), InstallError> {
        let command = format!("{} install", self.npm.display());
        let output = Command::new(&self.npm)
            .arg("install")
            .current_dir(dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| InstallError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(InstallError::Failed {
                command,
                code: output.status.code(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL),
            });
        }
        info!("dependencies installed");
        Ok(())
    }

    /// Run the project's tests with the terminal attached.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn run_tests(&self, dir: &Path, options: TestOptions) -> Result<(), InstallError> {
        let args = options.npx_args();
        let command = format!("{} {}", self.npx.display(), args.join(" "));
        debug!(%command, "running tests");

        let status = Command::new(&self.npx)
            .args(&args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| InstallError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::Failed {
                command,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

/// `node --version` without the leading `v`, or `None` when Node.js is
/// not installed.
pub async fn node_version() -> Option<String> {
    let output = Command::new("node")
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(version.trim_start_matches('v').to_string()).filter(|v| !v.is_empty())
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jest_flags_follow_options() {
        assert_eq!(TestOptions::default().npx_args(), ["jest"]);
        let opts = TestOptions {
            watch: true,
            coverage: true,
            e2e: false,
        };
        assert_eq!(opts.npx_args(), ["jest", "--watch", "--coverage"]);
    }

    #[test]
    fn e2e_uses_playwright() {
        let opts = TestOptions {
            e2e: true,
            coverage: true,
            ..Default::default()
        };
        assert_eq!(opts.npx_args(), ["playwright", "test"]);
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let pm = PackageManager::with_programs("/nonexistent/npm", "/nonexistent/npx");
        let err = pm.install(dir.path()).await.unwrap_err();
        assert!(matches!(err, InstallError::Spawn { .. }));
        assert!(!err.suggestions().is_empty());
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_install_keeps_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let npm = script(dir.path(), "npm", "echo 'ERR! network' >&2; exit 1");
        let pm = PackageManager::with_programs(npm, "npx");
        match pm.install(dir.path()).await.unwrap_err() {
            InstallError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("ERR! network"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failures_propagate_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let pass = script(dir.path(), "npx-pass", "exit 0");
        let fail = script(dir.path(), "npx-fail", "exit 3");

        PackageManager::with_programs("npm", pass)
            .run_tests(dir.path(), TestOptions::default())
            .await
            .unwrap();
        let err = PackageManager::with_programs("npm", fail)
            .run_tests(dir.path(), TestOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit code 3"));
    }
}
