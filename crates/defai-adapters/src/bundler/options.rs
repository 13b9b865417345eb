use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that shapes one webpack run.
#[derive(Debug, Clone, PartialEq)]
pub struct BundlerOptions {
    pub mode: Mode,
    pub project_dir: PathBuf,
    pub hot: bool,
    pub port: u16,
    pub host: String,
    pub analyze: bool,
    pub source_maps: bool,
    pub minify: bool,
    /// Relative to `project_dir` unless absolute.
    pub output_dir: PathBuf,
    /// Port of the preview server the dev server proxies to.
    pub preview_port: Option<u16>,
}

impl BundlerOptions {
    pub fn development(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::Development,
            project_dir: project_dir.into(),
            hot: true,
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            analyze: false,
            source_maps: true,
            minify: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            preview_port: None,
        }
    }

    pub fn production(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::Production,
            hot: false,
            source_maps: false,
            minify: true,
            ..Self::development(project_dir)
        }
    }

    pub fn output_path(&self) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            self.project_dir.join(&self.output_dir)
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}

/// Tool-owned directory inside a project.
pub const CONFIG_DIR: &str = ".defai";
pub const CONFIG_FILE: &str = "webpack.config.js";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_defaults_minify_without_maps() {
        let options = BundlerOptions::production("/work/el");
        assert!(options.minify);
        assert!(!options.source_maps);
        assert!(!options.hot);
        assert_eq!(options.output_path(), Path::new("/work/el/dist"));
    }

    #[test]
    fn absolute_output_dir_is_kept() {
        let mut options = BundlerOptions::production("/work/el");
        options.output_dir = PathBuf::from("/tmp/out");
        assert_eq!(options.output_path(), Path::new("/tmp/out"));
    }

    #[test]
    fn config_lives_under_dot_defai() {
        let options = BundlerOptions::development("/work/el");
        assert_eq!(
            options.config_path(),
            Path::new("/work/el/.defai/webpack.config.js")
        );
        assert_eq!(options.mode.to_string(), "development");
    }
}
