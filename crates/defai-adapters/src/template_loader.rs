//! Filesystem-based template loader.
//!
//! Discovers `template.toml` manifests under a directory (by default
//! `$DEFAI_TEMPLATES_DIR`) and turns each into a domain [`Template`]. The
//! same manifest format describes the built-in templates compiled into the
//! binary.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── price-feed/
//! │   ├── template.toml        ← manifest (required)
//! │   ├── package.json
//! │   ├── manifest.json
//! │   └── src/
//! │       └── index.tsx        ← entry file
//! └── ...
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id      = "price-feed"
//! version = "1.0.0"
//!
//! [metadata]
//! name        = "Price Feed"
//! description = "Streaming price ticker"   # optional
//! entry       = "src/index.tsx"            # file whose placeholders are replaced
//! tags        = ["trading"]                # optional
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use defai_core::{
    application::ApplicationError,
    domain::{
        DomainError, RelativePath, Template, TemplateContent, TemplateFile, TemplateId,
        TemplateMetadata,
    },
    error::CoreError,
};

/// Environment variable naming a directory of custom templates.
pub const TEMPLATES_DIR_ENV: &str = "DEFAI_TEMPLATES_DIR";

/// File name of a template's own manifest.
pub const TEMPLATE_MANIFEST: &str = "template.toml";

/// Directories never copied from a custom template.
const SKIPPED_DIRS: [&str; 4] = ["node_modules", "dist", ".git", ".defai"];

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("Templates directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid {TEMPLATE_MANIFEST} in {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<TemplateLoadError> for CoreError {
    fn from(e: TemplateLoadError) -> Self {
        match e {
            TemplateLoadError::Domain(d) => CoreError::Domain(d),
            TemplateLoadError::DirectoryNotFound(path) => ApplicationError::FilesystemError {
                reason: "Templates directory not found".into(),
                path,
            }
            .into(),
            TemplateLoadError::Io { path, source } => ApplicationError::FilesystemError {
                reason: source.to_string(),
                path,
            }
            .into(),
            other @ TemplateLoadError::Manifest { .. } => {
                CoreError::Domain(DomainError::InvalidTemplate(other.to_string()))
            }
        }
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised `template.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    pub metadata: MetadataSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub id: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSection {
    pub name: String,
    pub description: Option<String>,
    pub entry: String,
    pub tags: Option<Vec<String>>,
}

impl TemplateManifest {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, TemplateLoadError> {
        toml::from_str(raw).map_err(|source| TemplateLoadError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a validated template from this manifest and its files.
    pub fn into_template(
        self,
        files: impl IntoIterator<Item = TemplateFile>,
    ) -> Result<Template, TemplateLoadError> {
        let entry = RelativePath::try_new(normalize_path(&self.metadata.entry))?;
        let mut metadata = TemplateMetadata::new(self.metadata.name, entry)
            .description(self.metadata.description.unwrap_or_default())
            .tags(self.metadata.tags.unwrap_or_default());
        if let Some(version) = self.template.version {
            metadata = metadata.version(version);
        }

        Ok(Template::builder()
            .id(TemplateId::parse(&self.template.id)?)
            .metadata(metadata)
            .files(files)
            .build()?)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads every template under one directory.
///
/// Any directory (at most one level deep) holding a `template.toml` is one
/// template. Broken templates are skipped with a `WARN` so one bad template
/// never hides the others.
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// Loader for `$DEFAI_TEMPLATES_DIR`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(TEMPLATES_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.templates_dir
    }

    /// # Errors
    ///
    /// `DirectoryNotFound` if the directory is missing. Individual template
    /// failures are logged and skipped.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<Template>, TemplateLoadError> {
        if !self.templates_dir.is_dir() {
            return Err(TemplateLoadError::DirectoryNotFound(
                self.templates_dir.clone(),
            ));
        }

        let manifests = WalkDir::new(&self.templates_dir)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && e.file_name() == TEMPLATE_MANIFEST);

        let mut templates = Vec::new();
        for manifest in manifests {
            let Some(dir) = manifest.path().parent() else {
                continue;
            };
            match load_template_dir(dir) {
                Ok(template) => {
                    debug!(id = %template.id, "loaded template");
                    templates.push(template);
                }
                Err(e) => warn!(
                    dir = %dir.display(),
                    error = %e,
                    "skipping template directory due to load error"
                ),
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }
}

/// Load one template directory.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_template_dir(dir: &Path) -> Result<Template, TemplateLoadError> {
    let manifest_path = dir.join(TEMPLATE_MANIFEST);
    let raw = read(&manifest_path)?;
    let manifest = TemplateManifest::parse(&raw, &manifest_path)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry.map_err(|e| TemplateLoadError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if relative == Path::new(TEMPLATE_MANIFEST) {
            continue;
        }

        let path = RelativePath::try_new(normalize_path(&relative.to_string_lossy()))?;
        let content = read(entry.path())?;
        files.push(TemplateFile::new(path, TemplateContent::Owned(content)));
    }

    manifest.into_template(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn read(path: &Path) -> Result<String, TemplateLoadError> {
    fs::read_to_string(path).map_err(|source| TemplateLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
