//! Build results from webpack's `--json` stats, plus the output size limit.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use super::BundlerError;

/// Largest build output the marketplace accepts.
pub const MAX_BUNDLE_MB: u64 = 50;
pub const MAX_BUNDLE_BYTES: u64 = MAX_BUNDLE_MB * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub assets: Vec<Asset>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawStats {
    hash: Option<String>,
    time: Option<u64>,
    assets: Vec<RawAsset>,
    warnings: Vec<RawMessage>,
    errors: Vec<RawMessage>,
}

#[derive(Deserialize)]
struct RawAsset {
    name: String,
    #[serde(default)]
    size: u64,
}

/// webpack 4 reports plain strings, webpack 5 objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Text(String),
    Detailed {
        message: String,
        #[serde(default, rename = "moduleName")]
        module_name: Option<String>,
    },
}

impl From<RawMessage> for String {
    fn from(message: RawMessage) -> Self {
        match message {
            RawMessage::Text(text) => text,
            RawMessage::Detailed {
                message,
                module_name: Some(module),
            } => format!("{module}: {message}"),
            RawMessage::Detailed { message, .. } => message,
        }
    }
}

impl BuildReport {
    /// Parse the stats document webpack prints with `--json`. Anything the
    /// loaders print before the opening brace is ignored.
    pub fn from_stats_json(raw: &str) -> Result<Self, BundlerError> {
        let start = raw.find('{').ok_or_else(|| BundlerError::InvalidStats {
            reason: "no JSON object in webpack output".into(),
        })?;
        let stats: RawStats =
            serde_json::from_str(&raw[start..]).map_err(|e| BundlerError::InvalidStats {
                reason: e.to_string(),
            })?;

        let report = Self {
            assets: stats
                .assets
                .into_iter()
                .map(|a| Asset {
                    name: a.name,
                    size: a.size,
                })
                .collect(),
            warnings: stats.warnings.into_iter().map(String::from).collect(),
            errors: stats.errors.into_iter().map(String::from).collect(),
            time_ms: stats.time,
            hash: stats.hash,
        };
        debug!(
            assets = report.assets.len(),
            warnings = report.warnings.len(),
            errors = report.errors.len(),
            "webpack stats parsed"
        );
        Ok(report)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.assets.iter().map(|a| a.size).sum()
    }

    /// Fail with the compiler errors, if any.
    pub fn into_result(self) -> Result<Self, BundlerError> {
        if self.has_errors() {
            return Err(BundlerError::CompilationFailed {
                errors: self.errors,
            });
        }
        Ok(self)
    }
}

/// Total size in bytes of every file under `dir`.
pub fn dir_size(dir: &Path) -> Result<u64, BundlerError> {
    let mut total = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| BundlerError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|e| BundlerError::Io {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?;
            total += metadata.len();
        }
    }
    Ok(total)
}

/// Size of the build output, failing above [`MAX_BUNDLE_MB`].
pub fn validate_bundle_size(output_dir: &Path) -> Result<u64, BundlerError> {
    if !output_dir.is_dir() {
        return Err(BundlerError::OutputMissing(output_dir.to_path_buf()));
    }
    let size = dir_size(output_dir)?;
    check_size(size)?;
    Ok(size)
}

pub(crate) fn check_size(size: u64) -> Result<(), BundlerError> {
    if size > MAX_BUNDLE_BYTES {
        return Err(BundlerError::BundleTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            limit_mb: MAX_BUNDLE_MB,
        });
    }
    Ok(())
}

/// `512 B`, `12.34 KB`, `1.50 MB`
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{:.2} MB", b / (KB * KB))
    }
}
