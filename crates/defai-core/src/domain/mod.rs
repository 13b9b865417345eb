// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Element domain layer.
//!
//! Pure business logic: the manifest and descriptor schemas, the answers a
//! new element is created from, starter templates, and the validation rules
//! that gate `dev`, `build` and `publish`.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Few crates**: std, thiserror, serde/serde_json for the on-disk schemas
//! - **Rich domain model**: Behavior lives in entities, not services
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod validation;
pub mod value_objects;

// Re-exports for convenience
pub use entities::{
    common::RelativePath,
    descriptor::{DESCRIPTOR_FILE, ElementConfig, PACKAGE_SCOPE, ProjectDescriptor},
    element::{DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, ElementDetails, title_case},
    manifest::{ElementManifest, MANIFEST_FILE, PermissionSet, Size},
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    template::{
        Template, TemplateBuilder, TemplateContent, TemplateFile, TemplateId, TemplateMetadata,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use validation::{
    REQUIRED_MANIFEST_FIELDS, ValidationResult, validate_element_name, validate_permissions,
    validate_size,
};

pub use value_objects::{Capability, Category, Tier};
