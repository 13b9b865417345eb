//! Starter templates for new elements.
//!
//! ```text
//! Template (aggregate root)
//! ├── TemplateId        "react", "trading", ...
//! ├── TemplateMetadata  display name, description, entry file
//! └── Vec<TemplateFile>
//!      └── (RelativePath, TemplateContent)
//! ```
//!
//! Templates are copied file-for-file into the new project. Only three files
//! are rewritten on the way: the descriptor, the manifest and the entry file
//! (see the `TemplateRenderer` port). Everything else is copied verbatim.
//!
//! ## Why `TemplateContent` has `Static` and `Owned`
//!
//! Built-in templates are compiled into the binary and reference `&'static
//! str` without allocating. Templates loaded from a directory at runtime own
//! their content.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::{
    entities::{
        common::RelativePath, descriptor::DESCRIPTOR_FILE, manifest::MANIFEST_FILE,
    },
    error::DomainError,
};

// ============================================================================
// Template Identity
// ============================================================================

/// Short identifier chosen with `--template`, e.g. `react`.
///
/// Constraints: non-empty, lowercase ASCII letters, digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let id = s.trim();
        let valid = !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if valid {
            Ok(Self(id.to_string()))
        } else {
            Err(DomainError::InvalidTemplate(format!(
                "Invalid template id '{s}': use lowercase letters, digits and hyphens"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TemplateId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Content
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// Compiled into the binary.
    Static(&'static str),
    /// Loaded at runtime.
    Owned(String),
}

impl TemplateContent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }
}

/// One file of a template.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub path: RelativePath,
    pub content: TemplateContent,
}

impl TemplateFile {
    pub fn new(path: RelativePath, content: TemplateContent) -> Self {
        Self { path, content }
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Human-readable information about a template.
#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    /// Short display name, e.g. "React"
    pub name: String,

    /// One-line description for `defai-element templates`
    pub description: String,

    pub version: String,

    /// Source file whose placeholders are replaced, e.g. `src/index.tsx`
    pub entry: RelativePath,

    pub tags: Vec<String>,
}

impl TemplateMetadata {
    pub fn new(name: impl Into<String>, entry: RelativePath) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: "1.0.0".to_string(),
            entry,
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn version(mut self, ver: impl Into<String>) -> Self {
        self.version = ver.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

// ============================================================================
// Template Aggregate
// ============================================================================

/// A reusable element blueprint.
///
/// ## Invariants (enforced by `validate()`)
///
/// 1. At least one file
/// 2. No duplicate paths
/// 3. Contains `package.json` and `manifest.json`
/// 4. Contains the entry file named in its metadata
#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub metadata: TemplateMetadata,
    pub files: Vec<TemplateFile>,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.files.is_empty() {
            return Err(DomainError::EmptyTemplate {
                template_id: self.id.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            if !seen.insert(&file.path) {
                return Err(DomainError::DuplicatePath {
                    path: file.path.to_string(),
                });
            }
        }

        for required in [DESCRIPTOR_FILE, MANIFEST_FILE] {
            if self.file(required).is_none() {
                return Err(DomainError::InvalidTemplate(format!(
                    "Template '{}' has no {required}",
                    self.id
                )));
            }
        }

        if self.entry_file().is_none() {
            return Err(DomainError::InvalidTemplate(format!(
                "Template '{}' has no entry file {}",
                self.id, self.metadata.entry
            )));
        }

        Ok(())
    }

    /// Look up a file by its forward-slash path.
    pub fn file(&self, path: &str) -> Option<&TemplateFile> {
        self.files.iter().find(|f| f.path.to_slash_string() == path)
    }

    pub fn entry_file(&self) -> Option<&TemplateFile> {
        self.files.iter().find(|f| f.path == self.metadata.entry)
    }
}

/// Builder for templates; `build()` runs `validate()`.
#[derive(Default)]
pub struct TemplateBuilder {
    id: Option<TemplateId>,
    metadata: Option<TemplateMetadata>,
    files: Vec<TemplateFile>,
}

impl TemplateBuilder {
    pub fn id(mut self, id: TemplateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn file(mut self, file: TemplateFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn files(mut self, files: impl IntoIterator<Item = TemplateFile>) -> Self {
        self.files.extend(files);
        self
    }

    /// # Errors
    ///
    /// - `MissingRequiredField` if id or metadata are not set
    /// - any invariant violation from [`Template::validate`]
    pub fn build(self) -> Result<Template, DomainError> {
        let template = Template {
            id: self
                .id
                .ok_or(DomainError::MissingRequiredField { field: "id" })?,
            metadata: self
                .metadata
                .ok_or(DomainError::MissingRequiredField { field: "metadata" })?,
            files: self.files,
        };
        template.validate()?;
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn file(p: &str, content: &'static str) -> TemplateFile {
        TemplateFile::new(rel(p), TemplateContent::Static(content))
    }

    fn base() -> TemplateBuilder {
        Template::builder()
            .id(TemplateId::parse("react").unwrap())
            .metadata(TemplateMetadata::new("React", rel("src/index.tsx")))
            .file(file("package.json", "{}"))
            .file(file("manifest.json", "{}"))
    }

    #[test]
    fn builds_complete_template() {
        let template = base().file(file("src/index.tsx", "")).build().unwrap();
        assert_eq!(template.id.as_str(), "react");
        assert!(template.entry_file().is_some());
        assert!(template.file("package.json").is_some());
    }

    #[test]
    fn requires_entry_file() {
        let err = base().build().unwrap_err();
        assert!(err.to_string().contains("entry file"));
    }

    #[test]
    fn requires_descriptor_and_manifest() {
        let result = Template::builder()
            .id(TemplateId::parse("bare").unwrap())
            .metadata(TemplateMetadata::new("Bare", rel("src/index.tsx")))
            .file(file("src/index.tsx", ""))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        let dup = base()
            .file(file("src/index.tsx", ""))
            .file(file("src/index.tsx", ""))
            .build();
        assert!(matches!(dup, Err(DomainError::DuplicatePath { .. })));

        let empty = Template::builder()
            .id(TemplateId::parse("empty").unwrap())
            .metadata(TemplateMetadata::new("Empty", rel("src/index.tsx")))
            .build();
        assert!(matches!(empty, Err(DomainError::EmptyTemplate { .. })));
    }

    #[test]
    fn template_id_syntax() {
        assert!(TemplateId::parse("trading").is_ok());
        assert!(TemplateId::parse("React").is_err());
        assert!(TemplateId::parse("").is_err());
        assert_eq!("vue".parse::<TemplateId>().unwrap().to_string(), "vue");
    }
}
