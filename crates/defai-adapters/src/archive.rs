//! The `element.zip` bundle uploaded by `publish`.
//!
//! Layout, all paths relative to the archive root:
//!
//! ```text
//! manifest.json        the manifest as about to be published
//! <dist files>         build output, flattened to the root
//! package.json         without devDependencies
//! README.md            when present
//! LICENSE              when present
//! screenshots/*        png, jpg, jpeg, gif
//! ```

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use defai_core::domain::{DESCRIPTOR_FILE, MANIFEST_FILE};

pub const BUNDLE_FILE: &str = "element.zip";
pub const SCREENSHOTS_DIR: &str = "screenshots";
pub const SCREENSHOT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

const EXTRA_FILES: [&str; 2] = ["README.md", "LICENSE"];

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Build output not found at {0}")]
    MissingOutput(PathBuf),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create bundle: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingOutput(_) => vec!["Run 'defai-element build' first".into()],
            Self::Read { .. } | Self::Write { .. } => {
                vec!["Check file permissions in the project directory".into()]
            }
            Self::Zip(_) => vec![],
        }
    }
}

/// A written bundle.
#[derive(Debug, Clone)]
pub struct BundleArchive {
    pub path: PathBuf,
    pub size: u64,
    pub entries: Vec<String>,
}

impl BundleArchive {
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// `screenshots/<file>` paths for every image in the project's screenshot
/// directory, sorted.
pub fn collect_screenshots(project_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(project_dir.join(SCREENSHOTS_DIR)) else {
        return Vec::new();
    };
    let mut shots: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| is_screenshot(name))
        .map(|name| format!("{SCREENSHOTS_DIR}/{name}"))
        .collect();
    shots.sort();
    shots
}

fn is_screenshot(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SCREENSHOT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Write `<dist_dir>/element.zip`, replacing any previous one.
/// `manifest_json` is stored verbatim as `manifest.json`.
#[instrument(skip(manifest_json), fields(project = %project_dir.display()))]
pub fn create_bundle(
    project_dir: &Path,
    dist_dir: &Path,
    manifest_json: &str,
) -> Result<BundleArchive, ArchiveError> {
    if !dist_dir.is_dir() {
        return Err(ArchiveError::MissingOutput(dist_dir.to_path_buf()));
    }
    let bundle_path = dist_dir.join(BUNDLE_FILE);
    if bundle_path.exists() {
        remove_bundle(&bundle_path)?;
    }

    let file = File::create(&bundle_path).map_err(|source| ArchiveError::Write {
        path: bundle_path.clone(),
        source,
    })?;
    let mut writer = BundleWriter::new(file);

    writer.add_bytes(MANIFEST_FILE, manifest_json.as_bytes())?;

    for entry in WalkDir::new(dist_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Read {
            path: dist_dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() || entry.path() == bundle_path {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dist_dir) else {
            continue;
        };
        writer.add_file(&archive_name(relative), entry.path())?;
    }

    let descriptor = project_dir.join(DESCRIPTOR_FILE);
    if descriptor.is_file() {
        writer.add_bytes(DESCRIPTOR_FILE, &published_descriptor(&descriptor)?)?;
    }
    for name in EXTRA_FILES {
        let path = project_dir.join(name);
        if path.is_file() {
            writer.add_file(name, &path)?;
        }
    }
    for shot in collect_screenshots(project_dir) {
        writer.add_file(&shot, &project_dir.join(&shot))?;
    }

    let entries = writer.finish()?;
    let size = std::fs::metadata(&bundle_path)
        .map(|m| m.len())
        .map_err(|source| ArchiveError::Read {
            path: bundle_path.clone(),
            source,
        })?;
    info!(path = %bundle_path.display(), size, entries = entries.len(), "bundle created");

    Ok(BundleArchive {
        path: bundle_path,
        size,
        entries,
    })
}

/// Delete a bundle left behind by a failed upload.
pub fn remove_bundle(path: &Path) -> Result<(), ArchiveError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "bundle removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// package.json as shipped: development tooling stripped.
fn published_descriptor(path: &Path) -> Result<Vec<u8>, ArchiveError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArchiveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(mut value) => {
            if let Some(object) = value.as_object_mut() {
                object.remove("devDependencies");
            }
            let mut out = serde_json::to_vec_pretty(&value).unwrap_or_else(|_| raw.into_bytes());
            out.push(b'\n');
            Ok(out)
        }
        Err(e) => {
            warn!(error = %e, "package.json is not valid JSON, bundling as-is");
            Ok(raw.into_bytes())
        }
    }
}

/// Zip entry names always use `/`.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

struct BundleWriter {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
    entries: Vec<String>,
}

impl BundleWriter {
    fn new(file: File) -> Self {
        Self {
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            entries: Vec::new(),
        }
    }

    fn add_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.entries.iter().any(|e| e == name) {
            debug!(name, "duplicate entry skipped");
            return Ok(());
        }
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(bytes).map_err(|source| ArchiveError::Write {
            path: PathBuf::from(name),
            source,
        })?;
        self.entries.push(name.to_string());
        Ok(())
    }

    fn add_file(&mut self, name: &str, path: &Path) -> Result<(), ArchiveError> {
        let bytes = std::fs::read(path).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_bytes(name, &bytes)
    }

    fn finish(self) -> Result<Vec<String>, ArchiveError> {
        self.zip.finish()?;
        Ok(self.entries)
    }
}
