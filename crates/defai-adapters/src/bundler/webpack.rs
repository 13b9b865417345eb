//! Runs the project's own webpack through `npx`.

use std::{path::Path, process::Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

use super::{
    BuildReport, BundlerError, BundlerOptions, WebpackConfig, detect_entry,
    report::validate_bundle_size,
};

#[cfg(windows)]
pub const NPX: &str = "npx.cmd";
#[cfg(not(windows))]
pub const NPX: &str = "npx";

/// Lines of stderr kept when webpack dies without printing stats.
const STDERR_TAIL: usize = 20;

#[derive(Debug, Clone)]
pub struct Webpack {
    program: String,
}

impl Default for Webpack {
    fn default() -> Self {
        Self::new()
    }
}

impl Webpack {
    pub fn new() -> Self {
        Self::with_program(NPX)
    }

    /// Use `program` in place of `npx`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Write the config and generate it for the detected entry.
    pub fn prepare(&self, options: &BundlerOptions) -> Result<std::path::PathBuf, BundlerError> {
        let entry = detect_entry(options.project_dir())?;
        WebpackConfig::new(options, entry).write(options)
    }

    /// Production build: `npx webpack --config <file> --json`.
    ///
    /// Compile errors, a failing exit status and an output directory over
    /// the size limit are all errors.
    #[instrument(skip_all, fields(dir = %options.project_dir.display(), mode = %options.mode))]
    pub async fn build(&self, options: &BundlerOptions) -> Result<BuildReport, BundlerError> {
        let config_path = self.prepare(options)?;
        let command = format!("{} webpack --config {} --json", self.program, config_path.display());
        debug!(%command, "starting webpack");

        let output = Command::new(&self.program)
            .arg("webpack")
            .arg("--config")
            .arg(&config_path)
            .arg("--json")
            .current_dir(&options.project_dir)
            .env("NODE_ENV", options.mode.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BundlerError::Spawn { command, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "webpack", "{line}");
        }

        let report = match BuildReport::from_stats_json(&stdout) {
            Ok(report) => report.into_result()?,
            Err(_) if !output.status.success() => {
                return Err(BundlerError::ProcessFailed {
                    code: output.status.code(),
                    stderr: tail(&stderr),
                });
            }
            Err(e) => return Err(e),
        };
        if !output.status.success() {
            return Err(BundlerError::ProcessFailed {
                code: output.status.code(),
                stderr: tail(&stderr),
            });
        }

        for warning in &report.warnings {
            warn!(target: "webpack", "{warning}");
        }
        let size = validate_bundle_size(&options.output_path())?;
        info!(assets = report.assets.len(), bytes = size, "build finished");
        Ok(report)
    }

    /// Start `npx webpack serve` with inherited output. The child is killed
    /// when dropped.
    #[instrument(skip_all, fields(dir = %options.project_dir.display(), port = options.port))]
    pub fn serve(&self, options: &BundlerOptions) -> Result<Child, BundlerError> {
        let config_path = self.prepare(options)?;
        spawn_serve(&self.program, &config_path, &options.project_dir)
    }
}

fn spawn_serve(program: &str, config_path: &Path, project_dir: &Path) -> Result<Child, BundlerError> {
    let command = format!("{program} webpack serve --config {}", config_path.display());
    debug!(%command, "starting dev server");
    Command::new(program)
        .arg("webpack")
        .arg("serve")
        .arg("--config")
        .arg(config_path)
        .current_dir(project_dir)
        .env("NODE_ENV", "development")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BundlerError::Spawn { command, source })
}

fn tail(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(STDERR_TAIL)..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt, path::PathBuf};

    use super::*;

    /// A stand-in for `npx` that runs `script` with `sh`.
    fn fake_npx(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("fake-npx");
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.tsx"), "export {}").unwrap();
        dir
    }

    #[tokio::test]
    async fn successful_build_reports_assets() {
        let project = project();
        let npx = fake_npx(
            project.path(),
            r#"mkdir -p dist && printf 'bundle' > dist/main.js
echo '{"assets":[{"name":"main.js","size":6}],"warnings":[],"errors":[]}'"#,
        );

        let report = Webpack::with_program(npx.to_string_lossy())
            .build(&BundlerOptions::production(project.path()))
            .await
            .unwrap();

        assert_eq!(report.assets[0].name, "main.js");
        assert!(project.path().join(".defai/webpack.config.js").is_file());
    }

    #[tokio::test]
    async fn compile_errors_fail_the_build() {
        let project = project();
        let npx = fake_npx(
            project.path(),
            r#"echo '{"errors":[{"message":"Cannot find module react"}]}'
exit 1"#,
        );

        let err = Webpack::with_program(npx.to_string_lossy())
            .build(&BundlerOptions::production(project.path()))
            .await
            .unwrap_err();

        match err {
            BundlerError::CompilationFailed { errors } => {
                assert_eq!(errors, ["Cannot find module react"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn crash_without_stats_keeps_stderr() {
        let project = project();
        let npx = fake_npx(project.path(), "echo 'webpack-cli missing' >&2\nexit 2");

        let err = Webpack::with_program(npx.to_string_lossy())
            .build(&BundlerOptions::production(project.path()))
            .await
            .unwrap_err();

        match err {
            BundlerError::ProcessFailed { code, stderr } => {
                assert_eq!(code, Some(2));
                assert!(stderr.contains("webpack-cli missing"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let project = project();
        let err = Webpack::with_program("/definitely/not/npx")
            .build(&BundlerOptions::production(project.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::Spawn { .. }));
    }

    #[tokio::test]
    async fn missing_entry_stops_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let err = Webpack::with_program("/definitely/not/npx")
            .build(&BundlerOptions::production(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::EntryNotFound { .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let kept = tail(&text);
        assert!(kept.starts_with("line 10"));
        assert!(kept.ends_with("line 29"));
    }
}
