use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundlerError {
    #[error("No entry point found in {}/src (expected index.tsx, index.jsx, index.ts or index.js)", dir.display())]
    EntryNotFound { dir: PathBuf },

    #[error("Failed to write webpack config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Build failed with {} error(s)", errors.len())]
    CompilationFailed { errors: Vec<String> },

    #[error("webpack exited with status {code:?}: {stderr}")]
    ProcessFailed { code: Option<i32>, stderr: String },

    #[error("Could not parse webpack stats: {reason}")]
    InvalidStats { reason: String },

    #[error("Build output not found: {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("Bundle size ({size_mb:.2} MB) exceeds maximum allowed size ({limit_mb} MB)")]
    BundleTooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundlerError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EntryNotFound { .. } => vec![
                "Create src/index.tsx or src/index.jsx".into(),
                "Run: defai-element validate".into(),
            ],
            Self::Spawn { command, .. } => vec![
                format!("Ensure `{command}` can run in this shell"),
                "Install Node.js 18 or newer, then run: npm install".into(),
            ],
            Self::CompilationFailed { errors } => {
                let mut out: Vec<String> = errors.iter().take(5).cloned().collect();
                if errors.len() > 5 {
                    out.push(format!("... and {} more", errors.len() - 5));
                }
                out
            }
            Self::ProcessFailed { .. } | Self::InvalidStats { .. } => vec![
                "Check that webpack and ts-loader are installed: npm install".into(),
                "Re-run with -v to see the bundler output".into(),
            ],
            Self::OutputMissing(_) => vec!["Run: defai-element build".into()],
            Self::BundleTooLarge { .. } => vec![
                "Move large assets to a CDN".into(),
                "Run: defai-element build --analyze".into(),
            ],
            Self::ConfigWrite { .. } | Self::Io { .. } => {
                vec!["Check file permissions in the project directory".into()]
            }
        }
    }

    /// True for failures caused by the project's own sources.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound { .. }
                | Self::CompilationFailed { .. }
                | Self::OutputMissing(_)
                | Self::BundleTooLarge { .. }
        )
    }
}
