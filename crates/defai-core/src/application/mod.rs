//! Application layer.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ProjectValidator, MaterializeService, TemplateService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. All rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ConflictPolicy, CreateRequest, MaterializeOutcome, MaterializeService, ProjectValidator, TemplateInfo,
    TemplateService, ValidationOptions,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, TemplateRenderer, TemplateStore};

pub use error::ApplicationError;
