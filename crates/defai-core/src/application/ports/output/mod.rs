//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `defai-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{ElementDetails, ProjectStructure, Template, TemplateId};
use crate::error::CoreResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `defai_adapters::filesystem::LocalFilesystem` (production)
/// - `defai_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are passed through untouched; callers join them onto a project
/// root themselves.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> CoreResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> CoreResult<()>;

    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> CoreResult<String>;

    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory, in no particular order.
    fn read_dir(&self, path: &Path) -> CoreResult<Vec<PathBuf>>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> CoreResult<()>;
}

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `defai_adapters::template_store::InMemoryStore` (built-in and loaded templates)
pub trait TemplateStore: Send + Sync {
    /// Get a specific template by ID.
    fn get(&self, id: &TemplateId) -> CoreResult<Template>;

    /// List all available templates, sorted by id.
    fn list(&self) -> CoreResult<Vec<Template>>;

    /// Insert or replace a template.
    fn insert(&self, template: Template) -> CoreResult<()>;
}

/// Port for turning a template plus creation answers into files.
///
/// Implemented by:
/// - `defai_adapters::renderer::ElementRenderer`
pub trait TemplateRenderer: Send + Sync {
    /// Render a template into a project structure rooted at `output_root`.
    fn render(
        &self,
        template: &Template,
        details: &ElementDetails,
        output_root: &Path,
    ) -> CoreResult<ProjectStructure>;
}
